//! Species table on disk (CSV).
//!
//! Columns: `name,type1,type2,hp,attack,defense,sp_attack,sp_defense,speed`,
//! optionally followed by `height,weight`. Unknown columns are ignored.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::api::PokemonDetail;
use super::CatalogError;
use crate::models::{BaseStats, SpeciesStats};

/// One row of the species table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRow {
    pub name: String,
    pub type1: String,
    pub type2: Option<String>,
    pub hp: f64,
    pub attack: f64,
    pub defense: f64,
    pub sp_attack: f64,
    pub sp_defense: f64,
    pub speed: f64,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub weight: Option<u32>,
}

impl CatalogRow {
    /// Convert to a species record keyed by the lowercased name.
    pub fn into_species(self) -> SpeciesStats {
        SpeciesStats {
            name: self.name.trim().to_lowercase(),
            type1: self.type1,
            type2: self.type2.filter(|t| !t.trim().is_empty()),
            stats: BaseStats::new(
                self.hp,
                self.attack,
                self.defense,
                self.sp_attack,
                self.sp_defense,
                self.speed,
            ),
        }
    }
}

impl From<PokemonDetail> for CatalogRow {
    fn from(detail: PokemonDetail) -> Self {
        let s = detail.stats;
        Self {
            name: s.name,
            type1: s.type1,
            type2: s.type2,
            hp: s.stats.hp,
            attack: s.stats.attack,
            defense: s.stats.defense,
            sp_attack: s.stats.sp_attack,
            sp_defense: s.stats.sp_defense,
            speed: s.stats.speed,
            height: detail.height,
            weight: detail.weight,
        }
    }
}

/// Read species rows from any reader, skipping rows that don't parse or
/// carry invalid stats.
pub fn read_species<R: Read>(rdr: R) -> Result<Vec<SpeciesStats>, CatalogError> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut species = Vec::new();

    for (index, result) in reader.deserialize::<CatalogRow>().enumerate() {
        match result {
            Ok(row) => {
                let entry = row.into_species();
                if entry.name.is_empty() || !entry.stats.is_valid() {
                    warn!("Skipping species row {}: empty name or invalid stats", index + 1);
                    continue;
                }
                species.push(entry);
            }
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => warn!("Skipping species row {}: {}", index + 1, e),
        }
    }

    Ok(species)
}

/// Load the species table from a CSV file.
pub fn load_species_csv(path: &Path) -> Result<Vec<SpeciesStats>, CatalogError> {
    let file = File::open(path).map_err(|source| CatalogError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let species = read_species(file)?;
    info!("Loaded {} species from {}", species.len(), path.display());
    Ok(species)
}

/// Write species rows as CSV to any writer.
pub fn write_species<W: Write>(wtr: W, rows: &[CatalogRow]) -> Result<usize, CatalogError> {
    let mut writer = csv::Writer::from_writer(wtr);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(rows.len())
}

/// Write the species table to a CSV file, creating parent directories.
pub fn save_species_csv(path: &Path, rows: &[CatalogRow]) -> Result<usize, CatalogError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let count = write_species(File::create(path)?, rows)?;
    info!("Wrote {} species to {}", count, path.display());
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const SAMPLE: &str = "\
name,type1,type2,hp,attack,defense,sp_attack,sp_defense,speed,height,weight
Bulbasaur,grass,poison,45,49,49,65,65,45,7,69
charmander,fire,,39,52,43,60,50,65,6,85
";

    #[test]
    fn test_read_species() {
        let species = read_species(SAMPLE.as_bytes()).unwrap();

        assert_eq!(species.len(), 2);
        assert_eq!(
            species[0],
            SpeciesStats::new(
                "bulbasaur",
                "grass",
                BaseStats::new(45.0, 49.0, 49.0, 65.0, 65.0, 45.0)
            )
            .with_type2("poison")
        );
        assert_eq!(species[1].name, "charmander");
        assert_eq!(species[1].type2, None);
    }

    #[test]
    fn test_read_species_without_optional_columns() {
        let csv_data = "\
name,type1,type2,hp,attack,defense,sp_attack,sp_defense,speed
Ditto,normal,,48,48,48,48,48,48
";
        let species = read_species(csv_data.as_bytes()).unwrap();
        assert_eq!(species.len(), 1);
        assert_eq!(species[0].stats.speed, 48.0);
    }

    #[test]
    fn test_read_species_skips_bad_rows() {
        let csv_data = "\
name,type1,type2,hp,attack,defense,sp_attack,sp_defense,speed
Ditto,normal,,48,48,48,48,48,48
Glitch,normal,,,48,48,48,48,48
Negative,normal,,-1,48,48,48,48,48
,normal,,1,1,1,1,1,1
Mew,psychic,,100,100,100,100,100,100
";
        let species = read_species(csv_data.as_bytes()).unwrap();
        let names: Vec<&str> = species.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["ditto", "mew"]);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_species_csv(Path::new("/nonexistent/species.csv")).unwrap_err();
        assert!(matches!(err, CatalogError::Open { .. }));
    }

    #[test]
    fn test_save_and_load_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("species.csv");

        let detail = PokemonDetail {
            stats: SpeciesStats::new(
                "garganacl",
                "rock",
                BaseStats::new(100.0, 100.0, 130.0, 45.0, 90.0, 35.0),
            ),
            height: Some(23),
            weight: Some(2400),
        };
        let written = save_species_csv(&path, &[CatalogRow::from(detail.clone())]).unwrap();
        assert_eq!(written, 1);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with(
            "name,type1,type2,hp,attack,defense,sp_attack,sp_defense,speed,height,weight"
        ));

        let loaded = load_species_csv(&path).unwrap();
        assert_eq!(loaded, vec![detail.stats]);
    }
}
