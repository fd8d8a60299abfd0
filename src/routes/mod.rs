pub(crate) mod alerts;
pub(crate) mod analysis;
pub(crate) mod health;
pub(crate) mod prices;
