//! `slowandarain destinations` command implementation.

use crate::cli::content::{self, set_if};
use crate::cli::open_app;
use crate::core::Destination;
use crate::error::Result;
use clap::{Args, Subcommand};

/// Destination subcommands.
#[derive(Debug, Subcommand)]
pub enum DestinationCommand {
    /// List destinations in carousel order.
    List,

    /// Show one destination.
    Show {
        /// Destination id.
        id: i64,
    },

    /// Add a destination (admin).
    Add {
        /// Title.
        #[arg(long)]
        title: String,

        #[command(flatten)]
        fields: DestinationFields,
    },

    /// Edit a destination (admin). Omitted fields keep their value.
    Edit {
        /// Destination id.
        id: i64,

        /// New title.
        #[arg(long)]
        title: Option<String>,

        #[command(flatten)]
        fields: DestinationFields,
    },

    /// Delete a destination (admin).
    Delete {
        /// Destination id.
        id: i64,

        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },
}

/// Optional destination fields.
#[derive(Debug, Args)]
pub struct DestinationFields {
    /// Description.
    #[arg(long)]
    pub description: Option<String>,

    /// Location label.
    #[arg(long)]
    pub location: Option<String>,

    /// Date label, e.g. "March 2024".
    #[arg(long)]
    pub date: Option<String>,

    /// Image file path or `data:` URI.
    #[arg(long)]
    pub image: Option<String>,
}

impl DestinationFields {
    fn apply(self, dest: &mut Destination) {
        set_if(&mut dest.description, self.description);
        set_if(&mut dest.location, self.location);
        set_if(&mut dest.date, self.date);
    }
}

/// Run a destinations subcommand.
///
/// # Errors
///
/// Returns an error if the backend or the requested operation fails.
pub fn run(command: DestinationCommand) -> Result<()> {
    let app = open_app()?;
    match command {
        DestinationCommand::List => content::list::<Destination>(&app, |d| {
            format!("{:<6} {:<32} {:<20} {}", d.id, d.title, d.location, d.date)
        }),
        DestinationCommand::Show { id } => content::show::<Destination>(&app, &id, details),
        DestinationCommand::Add { title, fields } => {
            let image = fields.image.clone();
            content::add::<Destination>(&app, image.as_deref(), |d| {
                d.title = title;
                fields.apply(d);
            })
        }
        DestinationCommand::Edit { id, title, fields } => {
            let image = fields.image.clone();
            content::edit::<Destination>(&app, &id, image.as_deref(), |d| {
                set_if(&mut d.title, title);
                fields.apply(d);
            })
        }
        DestinationCommand::Delete { id, yes } => content::delete::<Destination>(&app, &id, yes),
    }
}

fn details(d: &Destination) -> Vec<(&'static str, String)> {
    vec![
        ("Id", d.id.to_string()),
        ("Location", d.location.clone()),
        ("Date", d.date.clone()),
        ("Description", d.description.clone()),
    ]
}
