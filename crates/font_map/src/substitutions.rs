//! Family substitutions
//!
//! A requested family is expanded into an ordered list of acceptable
//! families by running a fixed table of rules, in the manner of fontconfig's
//! alias configuration. Each rule tests the current list and, when the test
//! matches, inserts more families relative to the matched entry or at one end
//! of the list. The final list is compiled into a [`FamilyCrible`] mapping each
//! family to its rank.

use crate::aspect::normalize_family;
use std::collections::HashMap;
use std::sync::OnceLock;

pub const SERIF: &str = "serif";
pub const SANS_SERIF: &str = "sans-serif";
pub const MONOSPACE: &str = "monospace";
pub const CURSIVE: &str = "cursive";
pub const FANTASY: &str = "fantasy";
pub const MATH: &str = "math";
pub const EMOJI: &str = "emoji";

/// Check if `family` (normalized) is a CSS generic family
pub fn is_generic_family(family: &str) -> bool {
    matches!(
        family,
        SERIF | SANS_SERIF | MONOSPACE | CURSIVE | FANTASY | MATH | EMOJI
    )
}

/// Ordered working list of families
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FamilyList(Vec<String>);

impl FamilyList {
    pub fn new<S: AsRef<str>>(families: &[S]) -> Self {
        Self(families.iter().map(|f| f.as_ref().to_string()).collect())
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    fn position_equals(&self, family: &str) -> Option<usize> {
        self.0.iter().position(|f| f == family)
    }

    fn position_contains(&self, family: &str) -> Option<usize> {
        self.0.iter().position(|f| f.contains(family))
    }

    fn insert_at(&mut self, pos: usize, families: &[String]) {
        self.0.splice(pos..pos, families.iter().cloned());
    }

    /// Apply one rule to the list
    pub fn execute(&mut self, rule: &Substitution) {
        let Some(pos) = rule.test.matches(self) else {
            return;
        };
        match rule.op {
            SubstitutionOp::Append => self.insert_at(pos + 1, &rule.families),
            SubstitutionOp::AppendLast => self.0.extend(rule.families.iter().cloned()),
            SubstitutionOp::Prepend => self.insert_at(pos, &rule.families),
            SubstitutionOp::PrependFirst => self.insert_at(0, &rule.families),
            SubstitutionOp::Replace => {
                self.0.splice(pos..=pos, rule.families.iter().cloned());
            }
        }
    }

    /// Rank every family by position, keeping the best rank of duplicates.
    pub fn compile_to(&self, crible: &mut FamilyCrible) {
        for (rank, family) in self.0.iter().enumerate() {
            crible.0.entry(family.clone()).or_insert(rank);
        }
    }
}

/// Where a rule inserts its families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubstitutionOp {
    /// Right after the matched family
    Append,
    /// At the end of the list
    AppendLast,
    /// Right before the matched family
    Prepend,
    /// At the start of the list
    PrependFirst,
    /// In place of the matched family
    Replace,
}

/// Condition triggering a rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubstitutionTest {
    /// A family of the list equals the given one
    FamilyEquals(String),
    /// A family of the list contains the given string
    FamilyContains(String),
    /// No family of the list is `serif`, `sans-serif` or `monospace`
    NoGenericFamily,
}

impl SubstitutionTest {
    /// Position of the matched family. For list-wide tests, the first
    /// position is returned.
    pub fn matches(&self, list: &FamilyList) -> Option<usize> {
        match self {
            SubstitutionTest::FamilyEquals(family) => list.position_equals(family),
            SubstitutionTest::FamilyContains(family) => list.position_contains(family),
            SubstitutionTest::NoGenericFamily => {
                let has_generic = list
                    .0
                    .iter()
                    .any(|f| matches!(f.as_str(), SERIF | SANS_SERIF | MONOSPACE));
                if has_generic || list.0.is_empty() {
                    None
                } else {
                    Some(0)
                }
            }
        }
    }
}

/// One substitution rule, with normalized family names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub test: SubstitutionTest,
    pub families: Vec<String>,
    pub op: SubstitutionOp,
}

impl Substitution {
    pub fn new(test: SubstitutionTest, families: &[&str], op: SubstitutionOp) -> Self {
        let test = match test {
            SubstitutionTest::FamilyEquals(f) => SubstitutionTest::FamilyEquals(normalize_family(&f)),
            SubstitutionTest::FamilyContains(f) => SubstitutionTest::FamilyContains(normalize_family(&f)),
            SubstitutionTest::NoGenericFamily => SubstitutionTest::NoGenericFamily,
        };
        Self {
            test,
            families: families.iter().map(|f| normalize_family(f)).collect(),
            op,
        }
    }
}

/// Ranks of acceptable families, lower is better
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FamilyCrible(HashMap<String, usize>);

impl FamilyCrible {
    pub fn new() -> Self {
        Self::default()
    }

    /// Crible for one requested family
    ///
    /// Generic families are always expanded; other families only when
    /// `substitute` is set.
    pub fn for_family(family: &str, substitute: bool) -> Self {
        let family = normalize_family(family);
        let mut crible = Self::new();
        if substitute || is_generic_family(&family) {
            crible.fill_with_substitutions(&family, default_substitutions());
        } else {
            crible.0.insert(family, 0);
        }
        crible
    }

    /// Run `rules` starting from `family` and record the resulting ranks.
    pub fn fill_with_substitutions(&mut self, family: &str, rules: &[Substitution]) {
        let mut list = FamilyList::new(&[family]);
        for rule in rules {
            list.execute(rule);
        }
        list.compile_to(self);
    }

    pub fn rank(&self, family: &str) -> Option<usize> {
        self.0.get(family).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The built-in rules, in application order
pub fn default_substitutions() -> &'static [Substitution] {
    static RULES: OnceLock<Vec<Substitution>> = OnceLock::new();
    RULES.get_or_init(|| {
        RULE_TABLE
            .iter()
            .map(|(test, families, op)| {
                let test = match test {
                    RuleTest::Equals(f) => SubstitutionTest::FamilyEquals((*f).to_string()),
                    RuleTest::Contains(f) => SubstitutionTest::FamilyContains((*f).to_string()),
                    RuleTest::NoGeneric => SubstitutionTest::NoGenericFamily,
                };
                Substitution::new(test, families, *op)
            })
            .collect()
    })
}

enum RuleTest {
    Equals(&'static str),
    Contains(&'static str),
    NoGeneric,
}

use RuleTest::{Contains, Equals, NoGeneric};
use SubstitutionOp::{Append, AppendLast};

// Metric compatible aliases come first, then the generic family of well
// known families, then the default generic, then the expansion of each
// generic family into concrete ones.
static RULE_TABLE: &[(RuleTest, &[&str], SubstitutionOp)] = &[
    (Equals("Arial"), &["Liberation Sans", "Arimo", "Albany", "Albany AMT"], Append),
    (Equals("Helvetica"), &["Nimbus Sans", "Nimbus Sans L", "TeX Gyre Heros", "Liberation Sans", "Arimo"], Append),
    (Equals("Liberation Sans"), &["Arimo", "Arial", "Albany"], Append),
    (Equals("Arimo"), &["Liberation Sans", "Arial"], Append),
    (Equals("Arial Narrow"), &["Liberation Sans Narrow", "Nimbus Sans Narrow"], Append),
    (Equals("Times New Roman"), &["Liberation Serif", "Tinos", "Thorndale", "Thorndale AMT"], Append),
    (Equals("Times"), &["Nimbus Roman", "Nimbus Roman No9 L", "TeX Gyre Termes", "Liberation Serif", "Tinos"], Append),
    (Equals("Liberation Serif"), &["Tinos", "Times New Roman"], Append),
    (Equals("Tinos"), &["Liberation Serif", "Times New Roman"], Append),
    (Equals("Courier New"), &["Liberation Mono", "Cousine", "Cumberland", "Cumberland AMT"], Append),
    (Equals("Courier"), &["Nimbus Mono PS", "Nimbus Mono L", "TeX Gyre Cursor", "Liberation Mono", "Cousine"], Append),
    (Equals("Liberation Mono"), &["Cousine", "Courier New"], Append),
    (Equals("Cousine"), &["Liberation Mono", "Courier New"], Append),
    (Equals("Cambria"), &["Caladea"], Append),
    (Equals("Calibri"), &["Carlito"], Append),
    (Equals("Georgia"), &["Gelasio"], Append),
    (Equals("Symbol"), &["Standard Symbols PS", "Standard Symbols L"], Append),
    (Equals("Palatino"), &["P052", "TeX Gyre Pagella", "Palatino Linotype"], Append),
    (Equals("Bookman"), &["URW Bookman", "TeX Gyre Bonum"], Append),
    (Equals("Zapf Chancery"), &["Z003", "TeX Gyre Chorus"], Append),
    (Equals("Segoe UI"), &["Selawik", "Open Sans", "Noto Sans"], Append),
    (Equals("San Francisco"), &["SF Pro Text", "Helvetica Neue", "Inter"], Append),
    // generic family of well known families
    (Equals("Arial"), &[SANS_SERIF], AppendLast),
    (Equals("Helvetica"), &[SANS_SERIF], AppendLast),
    (Equals("Verdana"), &[SANS_SERIF], AppendLast),
    (Equals("DejaVu Sans"), &[SANS_SERIF], AppendLast),
    (Equals("Times New Roman"), &[SERIF], AppendLast),
    (Equals("Times"), &[SERIF], AppendLast),
    (Equals("Georgia"), &[SERIF], AppendLast),
    (Equals("DejaVu Serif"), &[SERIF], AppendLast),
    (Equals("Palatino"), &[SERIF], AppendLast),
    (Equals("Courier New"), &[MONOSPACE], AppendLast),
    (Equals("Courier"), &[MONOSPACE], AppendLast),
    (Equals("Consolas"), &[MONOSPACE], AppendLast),
    (Contains("Mono"), &[MONOSPACE], AppendLast),
    (Contains("Emoji"), &[EMOJI], AppendLast),
    (Contains("Math"), &[MATH], AppendLast),
    (Equals("Comic Sans MS"), &[CURSIVE], AppendLast),
    (Equals("Zapf Chancery"), &[CURSIVE], AppendLast),
    (Equals("Impact"), &[FANTASY], AppendLast),
    (NoGeneric, &[SANS_SERIF], AppendLast),
    // expansion of generic families
    (
        Equals(SERIF),
        &[
            "DejaVu Serif", "Noto Serif", "Liberation Serif", "Times New Roman", "Tinos",
            "Nimbus Roman", "Times", "Georgia", "Droid Serif", "Noto Serif CJK SC",
            "Noto Serif CJK JP", "Noto Serif Devanagari", "Noto Serif Hebrew", "Noto Naskh Arabic",
        ],
        Append,
    ),
    (
        Equals(SANS_SERIF),
        &[
            "DejaVu Sans", "Noto Sans", "Liberation Sans", "Arimo", "Arial", "Helvetica",
            "Nimbus Sans", "Verdana", "Segoe UI", "Roboto", "Open Sans", "Cantarell",
            "Droid Sans", "Noto Sans CJK SC", "Noto Sans CJK JP", "Noto Sans Devanagari",
            "Noto Sans Hebrew", "Noto Sans Arabic", "Noto Sans Thai",
        ],
        Append,
    ),
    (
        Equals(MONOSPACE),
        &[
            "DejaVu Sans Mono", "Noto Sans Mono", "Liberation Mono", "Cousine", "Courier New",
            "Nimbus Mono PS", "Courier", "Menlo", "Consolas", "Droid Sans Mono",
            "Noto Sans Mono CJK SC",
        ],
        Append,
    ),
    (
        Equals(CURSIVE),
        &["Comic Sans MS", "TeX Gyre Chorus", "Z003", "Apple Chancery", "URW Chancery L"],
        Append,
    ),
    (Equals(FANTASY), &["Impact", "Copperplate", "Papyrus", "Luminari"], Append),
    (
        Equals(MATH),
        &["STIX Two Math", "Cambria Math", "Latin Modern Math", "DejaVu Math TeX Gyre", "Noto Sans Math"],
        Append,
    ),
    (
        Equals(EMOJI),
        &["Noto Color Emoji", "Apple Color Emoji", "Segoe UI Emoji", "Twemoji", "EmojiOne Color"],
        Append,
    ),
];
