//! Restore canonical order for a shuffled, noisy label list.
//!
//! Three passes over the canonical labels:
//! 1. primary: full label against the normalized corpus;
//! 2. fallback: label split on spaces and slashes, first matching token wins;
//! 3. fill: leftover positions take the unused corpus indices in ascending order.
//!
//! A corpus index is claimed at most once, so the output is always a
//! permutation of `0..n`.

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::matcher::{MatchOptions, Matcher, Tier};
use crate::normalize::{normalize, split_tokens};

/// How a canonical position obtained its corpus index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchSource {
    /// Primary pass, full label.
    Tier(Tier),
    /// Fallback pass, via one token of the label.
    Token { token: String, tier: Tier },
    /// Best-effort fill without a lexical match.
    Filled,
}

/// Resolved canonical position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub index: usize,
    pub source: MatchSource,
}

/// Full outcome of one resolution, one slot per canonical position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub slots: Vec<Slot>,
}

impl Resolution {
    /// Corpus indices in canonical order.
    pub fn ordered(&self) -> Vec<usize> {
        self.slots.iter().map(|s| s.index).collect()
    }

    /// Number of positions that had to be filled without a match.
    pub fn filled(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| s.source == MatchSource::Filled)
            .count()
    }
}

pub struct Resolver {
    matcher: Matcher,
}

impl Resolver {
    pub fn new(opts: MatchOptions) -> Self {
        Self {
            matcher: Matcher::new(opts),
        }
    }

    /// Corpus indices in canonical order.
    pub fn resolve<C, I>(&self, canonical: &[C], items: &[I]) -> Result<Vec<usize>, ValidationError>
    where
        C: AsRef<str>,
        I: AsRef<str>,
    {
        self.resolve_detailed(canonical, items).map(|r| r.ordered())
    }

    pub fn resolve_detailed<C, I>(
        &self,
        canonical: &[C],
        items: &[I],
    ) -> Result<Resolution, ValidationError>
    where
        C: AsRef<str>,
        I: AsRef<str>,
    {
        if canonical.len() != items.len() {
            return Err(ValidationError::LengthMismatch {
                canonical: canonical.len(),
                items: items.len(),
            });
        }

        let corpus: Vec<String> = items.iter().map(|s| normalize(s.as_ref())).collect();
        let mut used: HashSet<usize> = HashSet::with_capacity(corpus.len());
        let mut slots: Vec<Option<Slot>> = vec![None; canonical.len()];

        // Primary pass
        for (pos, label) in canonical.iter().enumerate() {
            let label = label.as_ref();
            match self.matcher.best_match(label, &corpus) {
                Some(m) if used.insert(m.index) => {
                    tracing::debug!("'{}' -> item {} ({})", label, m.index, m.tier);
                    slots[pos] = Some(Slot {
                        index: m.index,
                        source: MatchSource::Tier(m.tier),
                    });
                }
                Some(m) => tracing::debug!(
                    "'{}' -> item {} already claimed; deferring",
                    label,
                    m.index
                ),
                None => tracing::debug!("'{}' unmatched in primary pass", label),
            }
        }

        // Fallback pass on tokens
        for (pos, label) in canonical.iter().enumerate() {
            if slots[pos].is_some() {
                continue;
            }
            let label = label.as_ref();
            for token in split_tokens(label) {
                if let Some(m) = self.matcher.best_match(token, &corpus)
                    && used.insert(m.index)
                {
                    tracing::debug!(
                        "'{}' -> item {} via token '{}' ({})",
                        label,
                        m.index,
                        token,
                        m.tier
                    );
                    slots[pos] = Some(Slot {
                        index: m.index,
                        source: MatchSource::Token {
                            token: token.to_string(),
                            tier: m.tier,
                        },
                    });
                    break;
                }
            }
        }

        // Best-effort fill
        let open: Vec<usize> = (0..slots.len()).filter(|&p| slots[p].is_none()).collect();
        let unused = (0..corpus.len()).filter(|i| !used.contains(i));
        for (pos, index) in open.into_iter().zip(unused) {
            tracing::warn!(
                "no match for '{}'; assigning unused item {}",
                canonical[pos].as_ref(),
                index
            );
            slots[pos] = Some(Slot {
                index,
                source: MatchSource::Filled,
            });
        }

        // equal lengths leave exactly one unused index per open position
        Ok(Resolution {
            slots: slots.into_iter().flatten().collect(),
        })
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(MatchOptions::default())
    }
}

/// Resolve with the default options.
pub fn resolve<C, I>(canonical: &[C], items: &[I]) -> Result<Vec<usize>, ValidationError>
where
    C: AsRef<str>,
    I: AsRef<str>,
{
    Resolver::default().resolve(canonical, items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::CanonicalList;
    use proptest::prelude::*;

    fn is_permutation(v: &[usize], n: usize) -> bool {
        let mut seen = vec![false; n];
        v.len() == n
            && v.iter().all(|&i| {
                if i >= n || seen[i] {
                    return false;
                }
                seen[i] = true;
                true
            })
    }

    #[test]
    fn exact_permutation_is_restored() {
        let canonical = CanonicalList::default();
        let items: Vec<String> = [3, 0, 9, 5, 1, 7, 2, 8, 4, 6]
            .iter()
            .map(|&i| canonical.labels()[i].clone())
            .collect();
        let res = Resolver::default()
            .resolve_detailed(canonical.labels(), &items)
            .unwrap();
        assert!(res.slots.iter().all(|s| s.source == MatchSource::Tier(Tier::Exact)));
        let ordered = res.ordered();
        for (pos, &idx) in ordered.iter().enumerate() {
            assert_eq!(items[idx], canonical.labels()[pos]);
        }
        assert_eq!(ordered, vec![1, 4, 6, 0, 8, 3, 9, 5, 7, 2]);
    }

    #[test]
    fn noisy_owasp_list_resolves() {
        let canonical = CanonicalList::default();
        let items = vec![
            "LLM06: Excessive Agency",
            "prompt-injection!!",
            "Unbounded Consumption",
            "Supply-Chain Vulnerabilities",
            "Vector & Embedding Weaknesses",
            "Sensitive Information Disclosure.",
            "Misinformation",
            "improper output handling",
            "Data and Model Poisoning",
            "System Prompt Leakage",
        ];
        let ordered = resolve(canonical.labels(), &items).unwrap();
        assert_eq!(ordered, vec![1, 5, 3, 8, 7, 0, 9, 4, 6, 2]);
    }

    #[test]
    fn token_fallback_resolves_split_label() {
        let canonical = ["Prompt Injection", "Overreliance / Misinformation"];
        let items = ["misinformation risks", "prompt injection"];
        let res = Resolver::default().resolve_detailed(&canonical, &items).unwrap();
        assert_eq!(res.ordered(), vec![1, 0]);
        assert_eq!(
            res.slots[1].source,
            MatchSource::Token {
                token: "Misinformation".to_string(),
                tier: Tier::Containment,
            }
        );
    }

    #[test]
    fn unrelated_label_gets_lowest_unused_index() {
        let canonical = ["Alpha Beta", "Zebra Crossing", "Gamma Delta"];
        let items = ["gamma delta", "qqqq", "alpha beta"];
        let res = Resolver::default().resolve_detailed(&canonical, &items).unwrap();
        assert_eq!(res.ordered(), vec![2, 1, 0]);
        assert_eq!(res.slots[1].source, MatchSource::Filled);
        assert_eq!(res.filled(), 1);
    }

    #[test]
    fn fill_assigns_in_position_order() {
        let canonical = ["xxxx", "Alpha", "yyyy"];
        let items = ["alpha", "kkkk", "mmmm"];
        assert_eq!(resolve(&canonical, &items).unwrap(), vec![1, 0, 2]);
    }

    #[test]
    fn claimed_index_is_not_reused() {
        // both labels land on item 0
        let canonical = ["Model Theft", "Model"];
        let items = ["model theft", "unrelated"];
        let res = Resolver::default().resolve_detailed(&canonical, &items).unwrap();
        assert_eq!(res.ordered(), vec![0, 1]);
        assert_eq!(res.slots[1].source, MatchSource::Filled);
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let canonical = CanonicalList::default();
        let items: Vec<String> = canonical.labels()[..9].to_vec();
        let err = resolve(canonical.labels(), &items).unwrap_err();
        assert_eq!(
            err,
            ValidationError::LengthMismatch {
                canonical: 10,
                items: 9
            }
        );
    }

    #[test]
    fn punctuation_only_label_takes_punctuation_only_item() {
        let canonical = ["zz", "!!"];
        let items = ["??", "qq"];
        let res = Resolver::default().resolve_detailed(&canonical, &items).unwrap();
        assert_eq!(res.ordered(), vec![1, 0]);
        assert_eq!(res.slots[1].source, MatchSource::Tier(Tier::Exact));
        assert_eq!(res.slots[0].source, MatchSource::Filled);
    }

    #[test]
    fn empty_inputs_resolve_to_empty() {
        let empty: [&str; 0] = [];
        assert_eq!(resolve(&empty, &empty).unwrap(), Vec::<usize>::new());
    }

    proptest! {
        #[test]
        fn output_is_always_a_permutation(
            pairs in prop::collection::vec(("[a-zA-Z /!-]{0,16}", "[a-zA-Z /!-]{0,16}"), 0..12)
        ) {
            let (canonical, items): (Vec<String>, Vec<String>) = pairs.into_iter().unzip();
            let out = resolve(&canonical, &items).unwrap();
            prop_assert!(is_permutation(&out, canonical.len()));
        }

        #[test]
        fn shuffled_canonical_is_inverted(seed in any::<u64>()) {
            let canonical = CanonicalList::default();
            let n = canonical.len();
            let mut perm: Vec<usize> = (0..n).collect();
            let mut s = seed;
            for i in (1..n).rev() {
                s = s.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                perm.swap(i, (s >> 33) as usize % (i + 1));
            }
            let items: Vec<String> = perm.iter().map(|&i| canonical.labels()[i].clone()).collect();
            let out = resolve(canonical.labels(), &items).unwrap();
            for (pos, &idx) in out.iter().enumerate() {
                prop_assert_eq!(perm[idx], pos);
            }
        }
    }
}
