use serde::{Deserialize, Serialize};
use std::fmt;

/// The video editing applications a tutorial can target.
///
/// Serialized as the display label so persisted history stays readable and
/// compatible with records written by earlier versions of the tutor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Variant {
    #[default]
    #[serde(rename = "Davinci Resolve")]
    DavinciResolve,
    #[serde(rename = "Sony Vegas")]
    SonyVegas,
    #[serde(rename = "Final Cut Pro")]
    FinalCutPro,
}

/// An sRGB colour, used to accent a variant in rendered output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Self = Self(0, 0, 0);
    pub const GRAY: Self = Self(150, 150, 150);

    /// `#rrggbb` form.
    #[must_use]
    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl Variant {
    /// All variants, in display order.
    pub const ALL: [Self; 3] = [Self::DavinciResolve, Self::SonyVegas, Self::FinalCutPro];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::DavinciResolve => "Davinci Resolve",
            Self::SonyVegas => "Sony Vegas",
            Self::FinalCutPro => "Final Cut Pro",
        }
    }

    /// Application-specific guidance embedded in every request for this
    /// variant.
    #[must_use]
    pub fn guidance(self) -> &'static str {
        match self {
            Self::DavinciResolve => {
                "When generating tutorials for Davinci Resolve, pay close attention to its unique \
                 'Page' structure (Edit, Cut, Fusion, Color, Fairlight, Deliver). Specify which \
                 page the user should be on for each step. Mention nodes when discussing color \
                 grading or Fusion effects."
            }
            Self::SonyVegas => {
                "For Sony Vegas, emphasize its powerful timeline-based editing and audio \
                 manipulation features. Refer to standard layouts and toolbars. Vegas Pro is \
                 known for its flexibility, so mention alternative ways to achieve a task if \
                 applicable."
            }
            Self::FinalCutPro => {
                "For Final Cut Pro, tutorials must reference the magnetic timeline, libraries, \
                 events, and projects. Explain how clips connect and how to use tools like the \
                 Position, Trim, and Blade tools within this non-traditional timeline."
            }
        }
    }

    #[must_use]
    pub fn accent_color(self) -> Rgb {
        match self {
            Self::DavinciResolve => Rgb(0x06, 0xb6, 0xd4),
            Self::SonyVegas => Rgb(0xa8, 0x55, 0xf7),
            Self::FinalCutPro => Rgb(0x3b, 0x82, 0xf6),
        }
    }

    /// Suggested questions offered before the first submission.
    #[must_use]
    pub fn example_prompts(self) -> [&'static str; 3] {
        match self {
            Self::DavinciResolve => [
                "How to color grade a cinematic video?",
                "Create a smooth slow-motion effect",
                "How to add and edit text titles?",
            ],
            Self::SonyVegas => [
                "How to create a video montage with music?",
                "Apply a green screen (chroma key) effect",
                "How to sync audio from multiple cameras?",
            ],
            Self::FinalCutPro => [
                "How to use the magnetic timeline?",
                "Create a multicam clip",
                "How to export for social media?",
            ],
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
