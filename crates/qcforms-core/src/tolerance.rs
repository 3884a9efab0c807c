//! Static tolerance scale for the production release form.
//!
//! Each category row of the release form is scored 0..=4 per sample. The
//! table maps a score to its label and colour token; a slot holding anything
//! that is not an exact score of its category is shown with the neutral
//! presentation.

use serde::Serialize;

/// One selectable score inside a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToleranceOption {
    pub value: i64,
    pub label: &'static str,
    pub color: &'static str,
}

impl ToleranceOption {
    /// Label text before the parenthesized detail, e.g. `"Very good"`.
    pub fn short_label(&self) -> &'static str {
        self.label.split('(').next().unwrap_or(self.label).trim()
    }

    /// Parenthesized detail without the brackets, if any.
    pub fn detail(&self) -> Option<&'static str> {
        let start = self.label.find('(')?;
        let rest = &self.label[start + 1..];
        Some(rest.strip_suffix(')').unwrap_or(rest))
    }
}

/// A row of the release form's sample table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToleranceCategory {
    pub id: u32,
    pub name: &'static str,
    pub options: &'static [ToleranceOption],
}

impl ToleranceCategory {
    /// Finds the option whose score equals `value` exactly.
    pub fn option(&self, value: i64) -> Option<&'static ToleranceOption> {
        self.options.iter().find(|o| o.value == value)
    }
}

/// Presentation of a sample slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Presentation {
    pub label: Option<&'static str>,
    pub color: &'static str,
    /// The matched score, when there is one.
    #[serde(skip)]
    pub option: Option<&'static ToleranceOption>,
}

impl Presentation {
    pub const NEUTRAL: Presentation = Presentation {
        label: None,
        color: NEUTRAL_COLOR,
        option: None,
    };

    pub fn short_label(&self) -> Option<&'static str> {
        self.option.map(ToleranceOption::short_label)
    }
}

pub const NEUTRAL_COLOR: &str = "gray-100";

const fn opt(value: i64, label: &'static str, color: &'static str) -> ToleranceOption {
    ToleranceOption {
        value,
        label,
        color,
    }
}

pub static TOLERANCE_TABLE: [ToleranceCategory; 8] = [
    ToleranceCategory {
        id: 1,
        name: "Vanilla extract with seeds colour",
        options: &[
            opt(4, "Very good (dark brown liquid)", "amber-900"),
            opt(3, "Good (brown liquid)", "amber-700"),
            opt(2, "Fair (pale brown liquid)", "amber-500"),
            opt(1, "Poor (yellowish brown liquid)", "amber-300"),
            opt(0, "Fail (any other color than brown)", "red-500"),
        ],
    },
    ToleranceCategory {
        id: 2,
        name: "Vanilla extract with seeds taste",
        options: &[
            opt(4, "Very good (sweet taste with full taste of vanilla extract)", "green-700"),
            opt(3, "Good (sweet taste with mild taste of vanilla extract)", "green-600"),
            opt(2, "Fair (sweet taste with slight vanilla taste)", "green-500"),
            opt(1, "Poor (sweet taste with slight off taste)", "yellow-500"),
            opt(0, "Fail (no sweet taste with clear off taste)", "red-500"),
        ],
    },
    ToleranceCategory {
        id: 3,
        name: "Vanilla extract with seeds weight",
        options: &[
            opt(4, "Very good (110g)", "blue-700"),
            opt(3, "Good (108g)", "blue-600"),
            opt(2, "Fair (105g)", "blue-500"),
            opt(1, "Poor (100g/105g)", "yellow-500"),
            opt(0, "Fail (50g/150g)", "red-500"),
        ],
    },
    ToleranceCategory {
        id: 4,
        name: "Is there any odour of fermentation?",
        options: &[
            opt(4, "Very good (typical smell vanilla extract)", "purple-700"),
            opt(3, "Good (mild smell of vanilla extract)", "purple-600"),
            opt(2, "Fair (slight off smell)", "purple-500"),
            opt(1, "Poor (slight fermented smell)", "yellow-500"),
            opt(0, "Fail (smell of fermentation)", "red-500"),
        ],
    },
    ToleranceCategory {
        id: 5,
        name: "Presence of foreign bodies",
        options: &[
            opt(4, "Very good (zero presence)", "indigo-700"),
            opt(3, "Good (presence of vanilla rope pieces)", "indigo-600"),
            opt(2, "Fair (presence of vanilla rope/raffia)", "indigo-500"),
            opt(1, "Poor (presence of material other than vanilla)", "yellow-500"),
            opt(0, "Fail (presence of metal/plastic/glass/metal/wood)", "red-500"),
        ],
    },
    ToleranceCategory {
        id: 6,
        name: "Is bottle correctly sealed",
        options: &[
            opt(4, "Very good (no gaps/product tight)", "teal-700"),
            opt(3, "Good (tight gap with no impact on product)", "teal-600"),
            opt(2, "Fair (gap can be seen but product does not move)", "teal-500"),
            opt(1, "Poor (gap can be seen but extract moving)", "yellow-500"),
            opt(0, "Fail (product leaking)", "red-500"),
        ],
    },
    ToleranceCategory {
        id: 7,
        name: "Is the labelling correct?",
        options: &[
            opt(4, "Very good (label straight)", "pink-700"),
            opt(3, "Good (1-3mm difference)", "pink-600"),
            opt(2, "Fair (3mm difference)", "pink-500"),
            opt(1, "Poor (3-4mm difference)", "yellow-500"),
            opt(0, "Fail (5 mm difference)", "red-500"),
        ],
    },
    ToleranceCategory {
        id: 8,
        name: "Is the stamping conform:",
        options: &[
            opt(4, "Very good (clear and neat)", "cyan-700"),
            opt(3, "Good (clear but with slight misalignment)", "cyan-600"),
            opt(2, "Fair (not clear but can be read)", "cyan-500"),
            opt(1, "Poor (stamping on barcode)", "yellow-500"),
            opt(0, "Fail (mistake in dates)", "red-500"),
        ],
    },
];

/// Number of sample rows on the release form.
pub fn category_count() -> usize {
    TOLERANCE_TABLE.len()
}

/// Returns the category for a sample row.
pub fn category(row: usize) -> Option<&'static ToleranceCategory> {
    TOLERANCE_TABLE.get(row)
}

/// Resolves how a sample slot value is presented.
///
/// Matching is exact numeric equality against the row's scores, zero
/// included. Empty, non-numeric or fractional values and unknown rows yield
/// [`Presentation::NEUTRAL`].
pub fn lookup(row: usize, value: &str) -> Presentation {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Presentation::NEUTRAL;
    }
    let Ok(number) = trimmed.parse::<f64>() else {
        return Presentation::NEUTRAL;
    };
    if !number.is_finite() || number.fract() != 0.0 {
        return Presentation::NEUTRAL;
    }

    category(row)
        .and_then(|c| c.option(number as i64))
        .map(|o| Presentation {
            label: Some(o.label),
            color: o.color,
            option: Some(o),
        })
        .unwrap_or(Presentation::NEUTRAL)
}
