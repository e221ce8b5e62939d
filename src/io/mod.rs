//! External collaborators: CSV, KML/KMZ, and PNG plotting. Kept outside
//! the core engine, which knows nothing about file formats.

pub mod csv;
pub mod kml;
pub mod plot;
