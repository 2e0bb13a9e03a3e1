mod params;
mod vat;
mod weight;

pub use params::VatParams;
pub use vat::VatConfig;
pub use weight::Weight;
