pub mod bundles;

pub mod clock;

pub mod config;

pub mod game_snapshot;

pub mod output;

pub mod parse;

pub mod schedule;

pub mod scoring;

pub mod side;

pub mod ultiscores;
