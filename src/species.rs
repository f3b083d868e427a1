use crate::errors::{DataError, DataResult};
use schema::{Species, SpeciesData};
use std::collections::HashMap;
use std::sync::LazyLock;

static SPECIES_TABLE: LazyLock<DataResult<HashMap<Species, SpeciesData>>> =
    LazyLock::new(|| load_species_table(include_str!("../data/species.ron")));

pub fn load_species_table(source: &str) -> DataResult<HashMap<Species, SpeciesData>> {
    let rows: Vec<SpeciesData> =
        ron::from_str(source).map_err(|err| DataError::MalformedTable(err.to_string()))?;
    let mut table = HashMap::with_capacity(rows.len());
    for row in rows {
        let id = row.species;
        if table.insert(id, row).is_some() {
            return Err(DataError::MalformedTable(format!("duplicate species row {:?}", id)));
        }
    }
    Ok(table)
}

pub fn get_species_data(species: Species) -> DataResult<&'static SpeciesData> {
    let table = SPECIES_TABLE.as_ref().map_err(Clone::clone)?;
    table.get(&species).ok_or(DataError::SpeciesNotFound(species))
}

#[cfg(test)]
mod tests {
    use super::*;
    use schema::PokemonType;
    use strum::IntoEnumIterator;

    #[test]
    fn every_species_has_a_row() {
        for species in Species::iter() {
            assert!(get_species_data(species).is_ok(), "missing row for {:?}", species);
        }
    }

    #[test]
    fn single_typed_species_repeat_their_type() {
        let data = get_species_data(Species::Pikachu).expect("row");
        assert_eq!(data.types, [PokemonType::Electric, PokemonType::Electric]);
        assert_eq!(data.base_stats.speed, 90);
    }
}
