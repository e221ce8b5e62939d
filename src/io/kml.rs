//! KML/KMZ trajectory export.
//!
//! The ZIP container is written with the `zip` crate's `deflate`
//! feature, since a raw deflate stream is not a ZIP archive on its own.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use zip::write::FileOptions;
use zip::ZipWriter;

use crate::errors::SimError;
use crate::sample::TrajectorySample;

/// Half-width, in m/s, of the "near zero" band used to flag the apex
/// (vz crossing zero) and fuel depletion (remaining_fuel near zero).
const VZ_APEX_BAND: f64 = 0.5;
const FUEL_DEPLETION_BAND: f64 = 1e-6;

fn render_kml(samples: &[TrajectorySample]) -> String {
    let mut kml = String::new();
    kml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    kml.push_str("<kml xmlns=\"http://www.opengis.net/kml/2.2\">\n<Document>\n");

    let apex_index = samples
        .iter()
        .position(|s| s.vz.abs() <= VZ_APEX_BAND)
        .or_else(|| {
            samples
                .windows(2)
                .position(|w| w[0].vz > 0.0 && w[1].vz <= 0.0)
                .map(|i| i + 1)
        });
    let fuel_depletion_index = samples
        .iter()
        .position(|s| s.remaining_fuel.abs() <= FUEL_DEPLETION_BAND);

    for (i, window) in samples.windows(2).enumerate() {
        let (a, b) = (&window[0], &window[1]);
        let lat_deg = a.lat.to_degrees();
        let lon_deg = a.lon.to_degrees();
        let lat2_deg = b.lat.to_degrees();
        let lon2_deg = b.lon.to_degrees();

        let mut style_ref = "";
        if apex_index == Some(i) {
            style_ref = "#apex";
        } else if fuel_depletion_index == Some(i) {
            style_ref = "#fuelDepleted";
        }

        kml.push_str("  <Placemark>\n");
        if !style_ref.is_empty() {
            kml.push_str(&format!("    <styleUrl>{}</styleUrl>\n", style_ref));
        }
        kml.push_str(&format!(
            "    <TimeSpan><begin>{:.4}</begin><end>{:.4}</end></TimeSpan>\n",
            a.time, b.time
        ));
        kml.push_str("    <LineString>\n      <coordinates>\n");
        kml.push_str(&format!(
            "        {lon1},{lat1},{alt1} {lon2},{lat2},{alt2}\n",
            lon1 = lon_deg,
            lat1 = lat_deg,
            alt1 = a.alt,
            lon2 = lon2_deg,
            lat2 = lat2_deg,
            alt2 = b.alt,
        ));
        kml.push_str("      </coordinates>\n    </LineString>\n");
        kml.push_str("  </Placemark>\n");
    }

    kml.push_str("  <Style id=\"apex\"><IconStyle><color>ff00ffff</color></IconStyle></Style>\n");
    kml.push_str(
        "  <Style id=\"fuelDepleted\"><IconStyle><color>ff0000ff</color></IconStyle></Style>\n",
    );
    kml.push_str("</Document>\n</kml>\n");
    kml
}

/// Write `samples` as a standalone `.kml` file.
pub fn write_kml(samples: &[TrajectorySample], path: &Path) -> Result<(), SimError> {
    let kml = render_kml(samples);
    std::fs::write(path, kml)?;
    Ok(())
}

/// Write `samples` as a `.kmz`: the same KML, deflated and stored as
/// `doc.kml` inside a ZIP container.
pub fn write_kmz(samples: &[TrajectorySample], path: &Path) -> Result<(), SimError> {
    let kml = render_kml(samples);

    let file = File::create(path)?;
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    zip.start_file("doc.kml", options)?;
    zip.write_all(kml.as_bytes())?;
    zip.finish()?;
    Ok(())
}
