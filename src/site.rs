//! Landing page composition and its plain-text rendering.

use crate::core::carousel::Carousel;
use crate::core::model::{Destination, Story};
use std::fmt::Write;

/// Site name shown in the navigation bar.
pub const SITE_NAME: &str = "Slowandarain";

/// A navigation anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavLink {
    /// Link text.
    pub label: &'static str,
    /// Section anchor.
    pub href: &'static str,
}

/// Navigation bar links, in order.
pub const NAV_LINKS: [NavLink; 4] = [
    NavLink {
        label: "Destinations",
        href: "#destinations",
    },
    NavLink {
        label: "Stories",
        href: "#stories",
    },
    NavLink {
        label: "Guides",
        href: "#guides",
    },
    NavLink {
        label: "Feedback",
        href: "#newsletter",
    },
];

/// Hero section copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hero {
    /// Small label above the headline.
    pub badge: &'static str,

    /// Main heading.
    pub headline: &'static str,

    /// Supporting sentence.
    pub tagline: &'static str,
}

/// The hero shown on the landing page.
pub const HERO: Hero = Hero {
    badge: "Explore the World",
    headline: "Adventures Await Around Every Corner",
    tagline: "Join us on a journey through breathtaking landscapes, vibrant cultures, \
              and unforgettable experiences from around the globe.",
};

/// A downloadable travel guide. Guides are static.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Guide {
    /// Catalog id.
    pub id: u32,

    /// Title.
    pub title: &'static str,

    /// One-line summary.
    pub description: &'static str,

    /// Cover image path.
    pub image: &'static str,

    /// Download count label, e.g. "2.3k".
    pub downloads: &'static str,
}

/// The guides shipped with the site.
pub const GUIDES: [Guide; 3] = [
    Guide {
        id: 1,
        title: "Ultimate Southeast Asia Backpacking Guide",
        description: "Everything you need to know for an epic adventure",
        image: "/southeast-asia-backpacking-beach-palm-trees.jpg",
        downloads: "2.3k",
    },
    Guide {
        id: 2,
        title: "European City Hopping on a Budget",
        description: "Visit 10 cities without breaking the bank",
        image: "/european-cities-architecture-panoramic.jpg",
        downloads: "1.8k",
    },
    Guide {
        id: 3,
        title: "Photography Tips for Travel",
        description: "Capture stunning memories on your journey",
        image: "/travel-photography-camera-landscape-sunset.jpg",
        downloads: "3.1k",
    },
];

/// Footer link columns.
pub const FOOTER_LINKS: [(&str, &[&str]); 2] = [
    (
        "Explore",
        &["Destinations", "Travel Stories", "Guides", "Photography"],
    ),
    ("Legal", &["Privacy Policy", "Terms of Service", "Cookie Policy"]),
];

/// Social links shown in the footer.
pub const SOCIAL_LINKS: [&str; 4] = ["Instagram", "Facebook", "Twitter", "YouTube"];

/// Everything the landing page shows.
#[derive(Debug, Clone, Copy)]
pub struct Page<'a> {
    /// Carousel destinations, in display order.
    pub destinations: &'a [Destination],

    /// Carousel position.
    pub carousel: &'a Carousel,

    /// Stories, newest first.
    pub stories: &'a [Story],

    /// Whether admin controls are shown.
    pub is_admin: bool,
}

impl Page<'_> {
    /// Render the page as plain text, section by section.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_nav(&mut out);
        render_hero(&mut out);
        self.render_destinations(&mut out);
        self.render_stories(&mut out);
        render_guides(&mut out);
        render_footer(&mut out);
        out
    }

    fn render_nav(&self, out: &mut String) {
        let links: Vec<&str> = NAV_LINKS.iter().map(|l| l.label).collect();
        let action = if self.is_admin { "Logout" } else { "Admin Login" };
        let _ = writeln!(out, "{SITE_NAME}  |  {}  |  [{action}]\n", links.join(" · "));
    }

    fn render_destinations(&self, out: &mut String) {
        let _ = writeln!(out, "== Featured Destinations ==");
        if self.is_admin {
            let _ = writeln!(out, "[+ Add Destination]");
        }
        match self.carousel.active_index() {
            None => {
                let _ = writeln!(out, "No destinations yet.");
            }
            Some(active) => {
                for (i, dest) in self.destinations.iter().enumerate() {
                    let marker = if i == active { '>' } else { ' ' };
                    let _ = writeln!(
                        out,
                        "{marker} {}. {} ({}, {})",
                        i + 1,
                        dest.title,
                        dest.location,
                        dest.date
                    );
                }
                let dots: String = (0..self.destinations.len())
                    .map(|i| if i == active { '●' } else { '○' })
                    .collect();
                let _ = writeln!(out, "  {dots}");
            }
        }
        out.push('\n');
    }

    fn render_stories(&self, out: &mut String) {
        let _ = writeln!(out, "== Travel Stories ==");
        if self.is_admin {
            let _ = writeln!(out, "[+ Add Story]");
        }
        if self.stories.is_empty() {
            let _ = writeln!(out, "No stories yet.");
        }
        for story in self.stories {
            let _ = writeln!(
                out,
                "- {} [{}] by {}, {}",
                story.title, story.category, story.author, story.read_time
            );
        }
        out.push('\n');
    }
}

fn render_hero(out: &mut String) {
    let _ = writeln!(out, "{}\n{}\n{}\n", HERO.badge, HERO.headline, HERO.tagline);
}

fn render_guides(out: &mut String) {
    let _ = writeln!(out, "== Free Travel Guides ==");
    for guide in &GUIDES {
        let _ = writeln!(
            out,
            "- {}: {} ({} downloads)",
            guide.title, guide.description, guide.downloads
        );
    }
    out.push('\n');
}

fn render_footer(out: &mut String) {
    for (heading, links) in &FOOTER_LINKS {
        let _ = writeln!(out, "{heading}: {}", links.join(", "));
    }
    let _ = writeln!(out, "Follow: {}", SOCIAL_LINKS.join(", "));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::Entity;
    use std::time::{Duration, Instant};

    fn destination(id: i64, title: &str) -> Destination {
        Destination {
            id,
            title: title.to_string(),
            location: "Japan".to_string(),
            date: "Recent".to_string(),
            ..Destination::blank()
        }
    }

    #[test]
    fn guides_are_fixed() {
        assert_eq!(GUIDES.len(), 3);
        assert_eq!(GUIDES[2].downloads, "3.1k");
    }

    #[test]
    fn empty_page_renders_empty_states() {
        let carousel = Carousel::new(Duration::from_secs(3));
        let page = Page {
            destinations: &[],
            carousel: &carousel,
            stories: &[],
            is_admin: false,
        };
        let text = page.render();
        assert!(text.contains("No destinations yet."));
        assert!(text.contains("No stories yet."));
        assert!(text.contains("[Admin Login]"));
        assert!(!text.contains("[+ Add"));
    }

    #[test]
    fn marks_active_slide_and_admin_controls() {
        let destinations = [destination(1, "Kyoto"), destination(2, "Osaka")];
        let mut carousel = Carousel::new(Duration::from_secs(3));
        carousel.sync_len(destinations.len(), Instant::now());
        carousel.next();

        let page = Page {
            destinations: &destinations,
            carousel: &carousel,
            stories: &[],
            is_admin: true,
        };
        let text = page.render();
        assert!(text.contains("> 2. Osaka (Japan, Recent)"));
        assert!(text.contains("  1. Kyoto"));
        assert!(text.contains("○●"));
        assert!(text.contains("[+ Add Destination]"));
        assert!(text.contains("[Logout]"));
    }
}
