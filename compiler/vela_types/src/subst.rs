//! Type-parameter substitution maps.

use smallvec::SmallVec;

use crate::Idx;

/// An ordered map from type parameter to bound type.
///
/// Insertion order is kept so that every consumer iterates bindings
/// deterministically.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Substitution {
    pairs: SmallVec<[(Idx, Idx); 4]>,
}

impl Substitution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `params` to `args` positionally.
    pub fn zip(params: &[Idx], args: &[Idx]) -> Self {
        Substitution {
            pairs: params.iter().copied().zip(args.iter().copied()).collect(),
        }
    }

    pub fn get(&self, param: Idx) -> Option<Idx> {
        self.pairs
            .iter()
            .find(|(p, _)| *p == param)
            .map(|(_, ty)| *ty)
    }

    pub fn contains(&self, param: Idx) -> bool {
        self.get(param).is_some()
    }

    /// Bind `param`, replacing an earlier binding in place.
    pub fn insert(&mut self, param: Idx, ty: Idx) {
        if let Some(slot) = self.pairs.iter_mut().find(|(p, _)| *p == param) {
            slot.1 = ty;
        } else {
            self.pairs.push((param, ty));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Idx, Idx)> + '_ {
        self.pairs.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// The bindings of `params` in order, or `None` if any is missing.
    pub fn args_for(&self, params: &[Idx]) -> Option<Vec<Idx>> {
        params.iter().map(|p| self.get(*p)).collect()
    }
}

impl FromIterator<(Idx, Idx)> for Substitution {
    fn from_iter<I: IntoIterator<Item = (Idx, Idx)>>(iter: I) -> Self {
        let mut subst = Substitution::new();
        for (param, ty) in iter {
            subst.insert(param, ty);
        }
        subst
    }
}
