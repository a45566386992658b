//! Font set and CSS font matching
//!
//! Footprints are stored in an append-only [`FontSet`]; everything else refers
//! to them by index. Narrowing a candidate list to the faces closest to a
//! requested aspect follows CSS Fonts Level 3, §5.2: stretch first, then
//! style, then weight.

use crate::aspect::{Aspect, Stretch, Style, Weight};
use crate::footprint::Footprint;
use crate::substitutions::FamilyCrible;

/// The intent of the author about the font to use
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// Requested families, the first having the highest priority
    pub families: Vec<String>,
    /// Selects one face among the fonts of a family
    pub aspect: Aspect,
}

impl Query {
    pub fn new<S: Into<String>>(families: impl IntoIterator<Item = S>, aspect: Aspect) -> Self {
        Self {
            families: families.into_iter().map(Into::into).collect(),
            aspect,
        }
    }
}

/// One narrowing pass of the matcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStage {
    Stretch,
    Style,
    Weight,
}

/// Stages in application order
pub const MATCH_STAGES: [MatchStage; 3] = [MatchStage::Stretch, MatchStage::Style, MatchStage::Weight];

impl MatchStage {
    /// Narrow `candidates` in place to the value of this stage closest to
    /// `query`.
    pub fn apply(self, fonts: &FontSet, candidates: &mut Vec<usize>, query: &Aspect) {
        if candidates.is_empty() {
            return;
        }
        match self {
            MatchStage::Stretch => {
                let best = fonts.match_stretch(candidates, query.stretch);
                candidates.retain(|&i| fonts[i].aspect.stretch == best);
            }
            MatchStage::Style => {
                let slanted = fonts.match_style(candidates, query.style);
                candidates.retain(|&i| fonts[i].aspect.style.is_slanted() == slanted);
            }
            MatchStage::Weight => {
                let best = fonts.match_weight(candidates, query.weight);
                candidates.retain(|&i| fonts[i].aspect.weight == best);
            }
        }
    }
}

/// Append-only list of the available footprints
#[derive(Debug, Clone, Default)]
pub struct FontSet(Vec<Footprint>);

impl FontSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a footprint and return its index
    pub fn push(&mut self, footprint: Footprint) -> usize {
        self.0.push(footprint);
        self.0.len() - 1
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Footprint> {
        self.0.iter()
    }

    /// Indices of the fonts matching `family`, best matches first
    ///
    /// With `substitute`, the family is expanded through the substitution
    /// rules; generic families are always expanded. At equal rank, user
    /// provided fonts come first, then insertion order.
    pub fn select_by_family(&self, family: &str, substitute: bool) -> Vec<usize> {
        let crible = FamilyCrible::for_family(family, substitute);
        self.select_by_crible(&crible)
    }

    pub fn select_by_crible(&self, crible: &FamilyCrible) -> Vec<usize> {
        let mut scored: Vec<(usize, usize)> = self
            .0
            .iter()
            .enumerate()
            .filter_map(|(index, fp)| crible.rank(&fp.family).map(|rank| (rank, index)))
            .collect();
        scored.sort_by_key(|&(rank, index)| (rank, !self.0[index].is_user_provided));
        scored.into_iter().map(|(_, index)| index).collect()
    }

    /// Narrow `candidates` to the faces closest to `query`
    ///
    /// The result is empty only if `candidates` was.
    pub fn retain_best_matches(&self, candidates: &mut Vec<usize>, query: &Aspect) {
        let query = query.with_defaults();
        for stage in MATCH_STAGES {
            stage.apply(self, candidates, &query);
        }
    }

    /// Indices of the user provided fonts
    pub fn user_provided(&self) -> Vec<usize> {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, fp)| fp.is_user_provided)
            .map(|(index, _)| index)
            .collect()
    }

    fn match_stretch(&self, candidates: &[usize], query: Stretch) -> Stretch {
        let mut narrower: Option<f32> = None;
        let mut wider: Option<f32> = None;
        for &index in candidates {
            let stretch = self.0[index].aspect.stretch.0;
            if stretch > query.0 {
                if wider.map_or(true, |w| stretch < w) {
                    wider = Some(stretch);
                }
            } else if stretch < query.0 {
                if narrower.map_or(true, |n| stretch > n) {
                    narrower = Some(stretch);
                }
            } else {
                return query;
            }
        }

        let best = if query.0 <= Stretch::NORMAL.0 {
            narrower.or(wider)
        } else {
            wider.or(narrower)
        };
        best.map_or(query, Stretch)
    }

    /// Whether the best style is slanted. Italic and oblique faces are
    /// interchangeable here; each keeps its own style.
    fn match_style(&self, candidates: &[usize], query: Style) -> bool {
        let wanted = query.is_slanted();
        let available = candidates
            .iter()
            .any(|&i| self.0[i].aspect.style.is_slanted() == wanted);
        if available {
            wanted
        } else {
            !wanted
        }
    }

    fn match_weight(&self, candidates: &[usize], query: Weight) -> Weight {
        let mut fatter: Option<u16> = None;
        let mut thinner: Option<u16> = None;
        for &index in candidates {
            let weight = self.0[index].aspect.weight.0;
            if weight > query.0 {
                if fatter.map_or(true, |f| weight < f) {
                    fatter = Some(weight);
                }
            } else if weight < query.0 {
                if thinner.map_or(true, |t| weight > t) {
                    thinner = Some(weight);
                }
            } else {
                return query;
            }
        }

        let best = if (400..=500).contains(&query.0) {
            fatter.filter(|&f| f <= 500).or(thinner).or(fatter)
        } else if query.0 < 400 {
            thinner.or(fatter)
        } else {
            fatter.or(thinner)
        };
        best.map_or(query, Weight)
    }
}

impl std::ops::Index<usize> for FontSet {
    type Output = Footprint;

    fn index(&self, index: usize) -> &Footprint {
        &self.0[index]
    }
}

impl FromIterator<Footprint> for FontSet {
    fn from_iter<I: IntoIterator<Item = Footprint>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
