//! Captions for the pictures that ship with the book

use crate::book::catalog::{BACK_ID, COVER_ID};

/// Caption shown next to a picture in the detail view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContent {
    pub title: String,
    pub event_name: String,
    pub lines: Vec<String>,
}

impl PageContent {
    fn from_static(entry: &BuiltinCaption) -> Self {
        Self {
            title: entry.title.to_string(),
            event_name: entry.event_name.to_string(),
            lines: entry.lines.iter().map(|line| line.to_string()).collect(),
        }
    }
}

struct BuiltinCaption {
    id: &'static str,
    title: &'static str,
    event_name: &'static str,
    lines: [&'static str; 2],
}

const DEFAULT_CAPTION: BuiltinCaption = BuiltinCaption {
    id: "",
    title: "Captured Moments",
    event_name: "Freshers Day 2025",
    lines: [
        "A snapshot from Freshers Day 2025 highlighting the AIML community.",
        "Every page reveals a different moment from the celebration.",
    ],
};

const BUILTIN_CAPTIONS: &[BuiltinCaption] = &[
    BuiltinCaption {
        id: COVER_ID,
        title: "Front Cover",
        event_name: "Freshers Day 2025",
        lines: [
            "Welcome to the ANEXSA Freshers Day 2025 memory book.",
            "Flip through to relive the celebration highlights.",
        ],
    },
    BuiltinCaption {
        id: BACK_ID,
        title: "Back Cover",
        event_name: "Freshers Day 2025",
        lines: [
            "Thank you for exploring the highlights from Freshers Day 2025.",
            "Stay tuned with ANEXSA for more memories and milestones.",
        ],
    },
    BuiltinCaption {
        id: "1",
        title: "AIML Jersey Launch",
        event_name: "Sports Day",
        lines: [
            "Fresh AIML jerseys revealed ahead of Sports Day celebrations.",
            "Led by the AIML HOD, the launch charged up the teams.",
        ],
    },
    BuiltinCaption {
        id: "2",
        title: "Final-Year AIML Group",
        event_name: "Ethnics Day",
        lines: [
            "Final-year AIML students unite for a traditional Ethnics Day shot.",
            "Their vibrant attire captures the branch's spirit and pride.",
        ],
    },
    BuiltinCaption {
        id: "3",
        title: "3rd Year CE Ensemble",
        event_name: "Ethnics Day",
        lines: [
            "Third-year Computer Engineering students showcase coordinated looks.",
            "A cheerful group portrait from the Ethnics Day festivities.",
        ],
    },
    BuiltinCaption {
        id: "4",
        title: "3rd Year AIML Crew",
        event_name: "Ethnics Day",
        lines: [
            "AIML juniors pose together after the Ethnics Day celebrations.",
            "Their unity and color palette brighten the campus courtyard.",
        ],
    },
    BuiltinCaption {
        id: "5",
        title: "ANEXSA Title Reveal",
        event_name: "Freshers Day Launch",
        lines: [
            "ANEXSA presents the Freshers Day title reveal poster.",
            "Excitement builds as the campaign is unveiled to the campus.",
        ],
    },
    BuiltinCaption {
        id: "6",
        title: "Principal's Title Reveal",
        event_name: "Freshers Day Launch",
        lines: [
            "Principal Sir unveils the Freshers Day title with faculty and team.",
            "The ceremonial launch sets the vision for the upcoming fest.",
        ],
    },
    BuiltinCaption {
        id: "7",
        title: "ANVAYA Poster Launch",
        event_name: "Anvaya",
        lines: [
            "Anvaya promotional poster revealed for the Freshers Day celebration.",
            "Creative design elements highlight the spirit of community and culture.",
        ],
    },
    BuiltinCaption {
        id: "8",
        title: "AIML & CE Flash Mob",
        event_name: "Freshers Day Launch",
        lines: [
            "Joint flash mob performance by AIML and CE branches.",
            "Energetic display marks the beginning of the festivities.",
        ],
    },
    BuiltinCaption {
        id: "9",
        title: "Mini AI Car Reveal",
        event_name: "Freshers Day Launch",
        lines: [
            "Innovative mini remote-control car used to introduce the Freshers Day title.",
            "Technology and creativity merge for a memorable reveal moment.",
        ],
    },
    BuiltinCaption {
        id: "10",
        title: "CE Title Reveal Crew",
        event_name: "Freshers Day Launch",
        lines: [
            "Third-year CE students gather post-title reveal for a commemorative photo.",
            "Their support ensured a seamless and spectacular launch presentation.",
        ],
    },
    BuiltinCaption {
        id: "11",
        title: "AIML Football Champions",
        event_name: "Sports Triumphs",
        lines: [
            "Victorious AIML football squad celebrates their tournament win.",
            "Their teamwork and determination shine through the trophy moment.",
        ],
    },
    BuiltinCaption {
        id: "12",
        title: "AIML Cricket Podium",
        event_name: "Sports Triumphs",
        lines: [
            "AIML cricket team celebrates securing second runners-up position.",
            "Medals and smiles mark their consistent tournament run.",
        ],
    },
    BuiltinCaption {
        id: "13",
        title: "Hacknex Highlights",
        event_name: "COGNEX Club",
        lines: [
            "Cognex Club's Hacknex program brings innovators under one roof.",
            "Hands-on workshops encouraged quick prototyping and teamwork.",
        ],
    },
    BuiltinCaption {
        id: "14",
        title: "Cognex Leadership",
        event_name: "COGNEX Club",
        lines: [
            "Portrait of the Cognex Club president and vice president.",
            "Their guidance continues to elevate AIML technical initiatives.",
        ],
    },
];

pub fn builtin_content(id: &str) -> Option<PageContent> {
    BUILTIN_CAPTIONS
        .iter()
        .find(|entry| entry.id == id)
        .map(PageContent::from_static)
}

/// Caption for pictures nobody wrote one for
pub fn default_content() -> PageContent {
    PageContent::from_static(&DEFAULT_CAPTION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_and_shipped_pictures_have_captions() {
        assert_eq!(builtin_content(COVER_ID).unwrap().title, "Front Cover");
        assert_eq!(builtin_content(BACK_ID).unwrap().title, "Back Cover");
        for n in 1..=14 {
            assert!(builtin_content(&n.to_string()).is_some(), "missing {n}");
        }
        assert!(builtin_content("15").is_none());
    }

    #[test]
    fn default_caption_has_two_lines() {
        let content = default_content();
        assert_eq!(content.title, "Captured Moments");
        assert_eq!(content.lines.len(), 2);
    }
}
