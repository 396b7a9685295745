//! Controller leagues and population helpers

use rand::Rng;
use softcube_core::Controller;

/// Sort by descending fitness. NaN fitness sorts last.
pub fn sort_by_fitness<T>(items: &mut [T], fitness: impl Fn(&T) -> f32) {
    items.sort_by(|a, b| {
        let (fa, fb) = (fitness(a), fitness(b));
        match (fa.is_nan(), fb.is_nan()) {
            (true, false) => std::cmp::Ordering::Greater,
            (false, true) => std::cmp::Ordering::Less,
            _ => fb.total_cmp(&fa),
        }
    });
}

/// Uniformly pick an index in `0..len` other than `exclude`
pub fn pick_partner<R: Rng + ?Sized>(rng: &mut R, len: usize, exclude: usize) -> Option<usize> {
    if len < 2 {
        return None;
    }
    let pick = rng.gen_range(0..len - 1);
    Some(if pick >= exclude { pick + 1 } else { pick })
}

/// The general controller pool and the elite pool promoted out of it
#[derive(Debug, Clone, Default)]
pub struct ControllerLeagues {
    pub little: Vec<Controller>,
    pub major: Vec<Controller>,
}

impl ControllerLeagues {
    pub fn sort(&mut self) {
        sort_by_fitness(&mut self.little, |c| c.fitness);
        sort_by_fitness(&mut self.major, |c| c.fitness);
    }

    /// Trim the major league to `survivors`, then move the best `count`
    /// little-league controllers into it. Returns how many were promoted.
    pub fn promote(&mut self, count: usize, survivors: usize) -> usize {
        self.sort();
        self.major.truncate(survivors);
        let count = count.min(self.little.len());
        self.major.extend(self.little.drain(..count));
        self.sort();
        count
    }

    /// All controllers, little league first
    pub fn iter(&self) -> impl Iterator<Item = &Controller> {
        self.little.iter().chain(self.major.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Controller> {
        self.little.iter_mut().chain(self.major.iter_mut())
    }

    pub fn len(&self) -> usize {
        self.little.len() + self.major.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fittest controller of either league
    pub fn best(&self) -> Option<&Controller> {
        self.iter()
            .filter(|c| !c.fitness.is_nan())
            .max_by(|a, b| a.fitness.total_cmp(&b.fitness))
    }
}
