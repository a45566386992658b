//! Visual variant of a face within its family: style, weight and stretch

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Font style (slant)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Style {
    #[default]
    Normal,
    Italic,
    Oblique,
}

impl Style {
    pub(crate) fn to_byte(self) -> u8 {
        match self {
            Style::Normal => 1,
            Style::Italic => 2,
            Style::Oblique => 3,
        }
    }

    /// Italic or oblique
    pub fn is_slanted(self) -> bool {
        matches!(self, Style::Italic | Style::Oblique)
    }

    pub(crate) fn from_byte(b: u8) -> Option<Self> {
        match b {
            1 => Some(Style::Normal),
            2 => Some(Style::Italic),
            3 => Some(Style::Oblique),
            _ => None,
        }
    }
}

/// Stroke thickness, from 1 to 1000 with 400 as normal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Weight(pub u16);

impl Weight {
    pub const THIN: Weight = Weight(100);
    pub const EXTRA_LIGHT: Weight = Weight(200);
    pub const LIGHT: Weight = Weight(300);
    pub const NORMAL: Weight = Weight(400);
    pub const MEDIUM: Weight = Weight(500);
    pub const SEMI_BOLD: Weight = Weight(600);
    pub const BOLD: Weight = Weight(700);
    pub const EXTRA_BOLD: Weight = Weight(800);
    pub const BLACK: Weight = Weight(900);
}

impl Default for Weight {
    fn default() -> Self {
        Weight::NORMAL
    }
}

/// Width as a percentage of the normal width (50% to 200%)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Stretch(pub f32);

impl Stretch {
    pub const ULTRA_CONDENSED: Stretch = Stretch(50.0);
    pub const EXTRA_CONDENSED: Stretch = Stretch(62.5);
    pub const CONDENSED: Stretch = Stretch(75.0);
    pub const SEMI_CONDENSED: Stretch = Stretch(87.5);
    pub const NORMAL: Stretch = Stretch(100.0);
    pub const SEMI_EXPANDED: Stretch = Stretch(112.5);
    pub const EXPANDED: Stretch = Stretch(125.0);
    pub const EXTRA_EXPANDED: Stretch = Stretch(150.0);
    pub const ULTRA_EXPANDED: Stretch = Stretch(200.0);

    /// Maps an OS/2 `usWidthClass` (1 to 9) to a percentage.
    pub fn from_width_class(class: u16) -> Self {
        match class {
            1 => Stretch::ULTRA_CONDENSED,
            2 => Stretch::EXTRA_CONDENSED,
            3 => Stretch::CONDENSED,
            4 => Stretch::SEMI_CONDENSED,
            6 => Stretch::SEMI_EXPANDED,
            7 => Stretch::EXPANDED,
            8 => Stretch::EXTRA_EXPANDED,
            9 => Stretch::ULTRA_EXPANDED,
            _ => Stretch::NORMAL,
        }
    }

    fn is_unset(self) -> bool {
        self.0.is_nan() || self.0 <= 0.0
    }
}

impl Default for Stretch {
    fn default() -> Self {
        Stretch::NORMAL
    }
}

// Stretch values come from a fixed set of finite constants or decoded
// caches; bitwise equality is what the matcher and the rune cache need.
impl Eq for Stretch {}

impl Hash for Stretch {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // -0.0 == 0.0, so both must hash alike
        let value = if self.0 == 0.0 { 0.0f32 } else { self.0 };
        value.to_bits().hash(state);
    }
}

/// The properties selecting one face among a family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Aspect {
    pub style: Style,
    pub weight: Weight,
    pub stretch: Stretch,
}

impl Aspect {
    pub fn new(style: Style, weight: Weight, stretch: Stretch) -> Self {
        Self { style, weight, stretch }
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn with_weight(mut self, weight: Weight) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_stretch(mut self, stretch: Stretch) -> Self {
        self.stretch = stretch;
        self
    }

    /// Replaces out-of-range weight and stretch by their normal values.
    pub fn with_defaults(mut self) -> Self {
        if self.weight.0 == 0 {
            self.weight = Weight::NORMAL;
        } else if self.weight.0 > 1000 {
            self.weight = Weight(1000);
        }
        if self.stretch.is_unset() {
            self.stretch = Stretch::NORMAL;
        }
        self
    }
}

impl fmt::Display for Aspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {} {}%", self.style, self.weight.0, self.stretch.0)
    }
}

/// Partially known aspect, as read from a font before defaults apply
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AspectHint {
    pub style: Option<Style>,
    pub weight: Option<Weight>,
    pub stretch: Option<Stretch>,
}

// Ordered so that compound keywords are tested before their suffixes.
const STYLE_KEYWORDS: &[(&str, Style)] = &[
    ("italic", Style::Italic),
    ("kursiv", Style::Italic),
    ("oblique", Style::Oblique),
];

const WEIGHT_KEYWORDS: &[(&str, Weight)] = &[
    ("thin", Weight::THIN),
    ("extralight", Weight::EXTRA_LIGHT),
    ("ultralight", Weight::EXTRA_LIGHT),
    ("demilight", Weight(350)),
    ("semilight", Weight(350)),
    ("light", Weight::LIGHT),
    ("book", Weight(380)),
    ("regular", Weight::NORMAL),
    ("normal", Weight::NORMAL),
    ("medium", Weight::MEDIUM),
    ("demibold", Weight::SEMI_BOLD),
    ("semibold", Weight::SEMI_BOLD),
    ("extrabold", Weight::EXTRA_BOLD),
    ("superbold", Weight::EXTRA_BOLD),
    ("ultrabold", Weight::EXTRA_BOLD),
    ("bold", Weight::BOLD),
    ("demi", Weight::SEMI_BOLD),
    ("ultrablack", Weight(920)),
    ("superblack", Weight(920)),
    ("extrablack", Weight(920)),
    ("black", Weight::BLACK),
    ("heavy", Weight::BLACK),
];

const STRETCH_KEYWORDS: &[(&str, Stretch)] = &[
    ("ultracondensed", Stretch::ULTRA_CONDENSED),
    ("extracondensed", Stretch::EXTRA_CONDENSED),
    ("semicondensed", Stretch::SEMI_CONDENSED),
    ("condensed", Stretch::CONDENSED),
    ("semiexpanded", Stretch::SEMI_EXPANDED),
    ("extraexpanded", Stretch::EXTRA_EXPANDED),
    ("ultraexpanded", Stretch::ULTRA_EXPANDED),
    ("expanded", Stretch::EXPANDED),
    ("extended", Stretch::EXPANDED),
];

fn find_keyword<T: Copy>(haystack: &str, table: &[(&str, T)]) -> Option<T> {
    table
        .iter()
        .find(|(keyword, _)| haystack.contains(keyword))
        .map(|(_, value)| *value)
}

impl AspectHint {
    /// Fills the missing fields from a free-form style name such as
    /// "Bold Condensed Italic".
    pub fn infer_from_style_name(&mut self, style_name: &str) {
        let name = normalize_family(style_name);
        if self.style.is_none() {
            self.style = find_keyword(&name, STYLE_KEYWORDS);
        }
        if self.weight.is_none() {
            self.weight = find_keyword(&name, WEIGHT_KEYWORDS);
        }
        if self.stretch.is_none() {
            self.stretch = find_keyword(&name, STRETCH_KEYWORDS);
        }
    }

    /// Completes the hint with normal values.
    pub fn resolve(self) -> Aspect {
        Aspect {
            style: self.style.unwrap_or_default(),
            weight: self.weight.unwrap_or_default(),
            stretch: self.stretch.unwrap_or_default(),
        }
        .with_defaults()
    }
}

/// Lower-cases `family` and strips blanks, so that "DejaVu Sans" and
/// "dejavusans" compare equal.
pub fn normalize_family(family: &str) -> String {
    family
        .chars()
        .filter(|c| *c != ' ' && *c != '\t')
        .flat_map(char::to_lowercase)
        .collect()
}
