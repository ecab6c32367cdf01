use crate::side::Side;
use core::ops::{Index, IndexMut};
use derivative::Derivative;
use serde::{Deserialize, Serialize};

#[derive(Derivative, Serialize, Deserialize)]
#[derivative(Default, Debug, Clone, PartialEq, Eq)]
pub struct HomeAwayBundle<T> {
    pub home: T,
    pub away: T,
}

impl<T> HomeAwayBundle<T> {
    pub fn from_fn(mut f: impl FnMut(Side) -> T) -> Self {
        Self {
            home: f(Side::Home),
            away: f(Side::Away),
        }
    }
}

impl<T> Index<Side> for HomeAwayBundle<T> {
    type Output = T;

    fn index(&self, side: Side) -> &Self::Output {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }
}

impl<T> IndexMut<Side> for HomeAwayBundle<T> {
    fn index_mut(&mut self, side: Side) -> &mut Self::Output {
        match side {
            Side::Home => &mut self.home,
            Side::Away => &mut self.away,
        }
    }
}

impl<'a, T> IntoIterator for &'a HomeAwayBundle<T> {
    type Item = (Side, &'a T);
    type IntoIter = core::array::IntoIter<(Side, &'a T), 2>;

    fn into_iter(self) -> Self::IntoIter {
        [(Side::Home, &self.home), (Side::Away, &self.away)].into_iter()
    }
}
