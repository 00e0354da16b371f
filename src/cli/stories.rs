//! `slowandarain stories` command implementation.

use crate::cli::content::{self, set_if};
use crate::cli::open_app;
use crate::core::Story;
use crate::error::Result;
use clap::{Args, Subcommand};

/// Story subcommands.
#[derive(Debug, Subcommand)]
pub enum StoryCommand {
    /// List stories, newest first.
    List,

    /// Show one story.
    Show {
        /// Story id.
        id: String,
    },

    /// Add a story (admin).
    Add {
        /// Title.
        #[arg(long)]
        title: String,

        #[command(flatten)]
        fields: StoryArgs,
    },

    /// Edit a story (admin). Omitted fields keep their value.
    Edit {
        /// Story id.
        id: String,

        /// New title.
        #[arg(long)]
        title: Option<String>,

        #[command(flatten)]
        fields: StoryArgs,
    },

    /// Delete a story (admin).
    Delete {
        /// Story id.
        id: String,

        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },
}

/// Optional story fields.
#[derive(Debug, Args)]
pub struct StoryArgs {
    /// Teaser text.
    #[arg(long)]
    pub excerpt: Option<String>,

    /// Author display name.
    #[arg(long)]
    pub author: Option<String>,

    /// Read time label, e.g. "5 min read".
    #[arg(long)]
    pub read_time: Option<String>,

    /// Category label.
    #[arg(long)]
    pub category: Option<String>,

    /// Image file path or `data:` URI.
    #[arg(long)]
    pub image: Option<String>,
}

impl StoryArgs {
    fn apply(self, story: &mut Story) {
        set_if(&mut story.excerpt, self.excerpt);
        set_if(&mut story.author, self.author);
        set_if(&mut story.read_time, self.read_time);
        set_if(&mut story.category, self.category);
    }
}

/// Run a stories subcommand.
///
/// # Errors
///
/// Returns an error if the backend or the requested operation fails.
pub fn run(command: StoryCommand) -> Result<()> {
    let app = open_app()?;
    match command {
        StoryCommand::List => content::list::<Story>(&app, |s| {
            format!("{:<38} {:<32} {:<12} {}", s.id, s.title, s.category, s.author)
        }),
        StoryCommand::Show { id } => content::show::<Story>(&app, &id, details),
        StoryCommand::Add { title, fields } => {
            let image = fields.image.clone();
            content::add::<Story>(&app, image.as_deref(), |s| {
                s.title = title;
                fields.apply(s);
            })
        }
        StoryCommand::Edit { id, title, fields } => {
            let image = fields.image.clone();
            content::edit::<Story>(&app, &id, image.as_deref(), |s| {
                set_if(&mut s.title, title);
                fields.apply(s);
            })
        }
        StoryCommand::Delete { id, yes } => content::delete::<Story>(&app, &id, yes),
    }
}

fn details(s: &Story) -> Vec<(&'static str, String)> {
    vec![
        ("Id", s.id.clone()),
        ("Author", s.author.clone()),
        ("Category", s.category.clone()),
        ("Read time", s.read_time.clone()),
        ("Excerpt", s.excerpt.clone()),
    ]
}
