use std::sync::Arc;

use enum_map::EnumMap;
use thiserror::Error;

use super::{
    units_file::{Extend, ExtendUnitEntry, Precedence, QuantityGroup, SIPrefix, UnitsFile, SI},
    BaseQuantity, Converter, Dimension, Unit, UnitIndex, UnknownUnit,
};

/// Builder to create a custom [`Converter`]
///
/// The builder uses [`UnitsFile`] to configure the converter. More than one
/// file can be layered. Order matters, as one file can extend the units of
/// another added before, or be overwritten by others after.
///
/// SI expansion and extends are resolved in [`ConverterBuilder::finish`], so
/// a layer can extend a unit generated from another layer.
#[derive(Debug, Default)]
pub struct ConverterBuilder {
    units: Vec<PendingUnit>,
    index: UnitIndex,
    extends: Vec<Extend>,
    si: SI,
}

#[derive(Debug)]
struct PendingUnit {
    unit: Unit,
    origin: Origin,
}

#[derive(Debug, Clone)]
enum Origin {
    /// Declared in a units file
    Declared {
        expand_si: bool,
        /// Ids of the generated units, once expanded
        prefixed: Option<EnumMap<SIPrefix, usize>>,
    },
    /// Generated from a declared unit and a prefix
    Prefixed,
}

impl ConverterBuilder {
    /// New empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the bundled units to the builder
    ///
    /// This is only available with the `bundled_units` feature.
    #[cfg(feature = "bundled_units")]
    pub fn with_bundled_units(mut self) -> Result<Self, ConverterBuilderError> {
        self.add_bundled_units()?;
        Ok(self)
    }

    /// Add the bundled units to the builder
    ///
    /// This is only available with the `bundled_units` feature.
    #[cfg(feature = "bundled_units")]
    pub fn add_bundled_units(&mut self) -> Result<&mut Self, ConverterBuilderError> {
        self.add_units_file(UnitsFile::bundled())
    }

    /// Add a [`UnitsFile`] to the builder
    pub fn with_units_file(mut self, units: UnitsFile) -> Result<Self, ConverterBuilderError> {
        self.add_units_file(units)?;
        Ok(self)
    }

    /// Add a [`UnitsFile`] to the builder
    pub fn add_units_file(&mut self, file: UnitsFile) -> Result<&mut Self, ConverterBuilderError> {
        let UnitsFile {
            si,
            extend,
            quantity,
        } = file;

        for group in quantity {
            self.add_group(group)?;
        }
        if let Some(extend) = extend {
            self.extends.push(extend);
        }
        if let Some(si) = si {
            self.si.merge(si);
        }
        Ok(self)
    }

    fn add_group(&mut self, group: QuantityGroup) -> Result<(), ConverterBuilderError> {
        let dimension = group_dimension(&group)?;
        let quantity: Arc<str> = group.quantity.into();
        for entry in group.units {
            let unit = Unit {
                names: entry.names,
                symbols: entry.symbols,
                aliases: entry.aliases,
                ratio: entry.ratio,
                difference: entry.difference,
                quantity: Arc::clone(&quantity),
                dimension: dimension.clone(),
            };
            self.push(
                unit,
                Origin::Declared {
                    expand_si: entry.expand_si,
                    prefixed: None,
                },
            )?;
        }
        Ok(())
    }

    /// Consume the builder and return the new [`Converter`]
    pub fn finish(mut self) -> Result<Converter, ConverterBuilderError> {
        self.expand_prefixes()?;
        for extend in std::mem::take(&mut self.extends) {
            self.apply_extend(extend)?;
        }

        tracing::debug!(units = self.units.len(), "converter built");

        Ok(Converter {
            all_units: self.units.into_iter().map(|p| Arc::new(p.unit)).collect(),
            unit_index: self.index,
        })
    }

    fn push(&mut self, unit: Unit, origin: Origin) -> Result<usize, ConverterBuilderError> {
        let id = self.units.len();
        self.index.add_unit(&unit, id)?;
        self.units.push(PendingUnit { unit, origin });
        Ok(id)
    }

    /// Generate a new unit for every SI prefix of the units marked to expand
    fn expand_prefixes(&mut self) -> Result<(), ConverterBuilderError> {
        let declared = self.units.len();
        for id in 0..declared {
            let Origin::Declared {
                expand_si: true, ..
            } = self.units[id].origin
            else {
                continue;
            };
            let mut ids = EnumMap::<SIPrefix, usize>::default();
            for (prefix, unit) in self.si.prefixed_units(&self.units[id].unit)? {
                ids[prefix] = self.push(unit, Origin::Prefixed)?;
            }
            self.units[id].origin = Origin::Declared {
                expand_si: true,
                prefixed: Some(ids),
            };
        }
        Ok(())
    }

    fn apply_extend(&mut self, extend: Extend) -> Result<(), ConverterBuilderError> {
        let Extend { precedence, units } = extend;

        // resolve every key before editing, keys refer to this layer's state
        let mut targets: Vec<(usize, ExtendUnitEntry)> = Vec::with_capacity(units.len());
        for (key, entry) in units {
            let id = self.index.get_unit_id(&key)?;
            if targets.iter().any(|(other, _)| *other == id) {
                return Err(ConverterBuilderError::DuplicateExtendUnit { key });
            }
            let only_aliases = entry.ratio.is_none()
                && entry.difference.is_none()
                && entry.names.is_none()
                && entry.symbols.is_none();
            if matches!(self.units[id].origin, Origin::Prefixed) && !only_aliases {
                return Err(ConverterBuilderError::InvalidExtendExpanded { key });
            }
            targets.push((id, entry));
        }

        for (id, entry) in targets {
            self.unindex(id);

            let unit = &mut self.units[id].unit;
            if let Some(ratio) = entry.ratio {
                unit.ratio = ratio;
            }
            if let Some(difference) = entry.difference {
                unit.difference = difference;
            }
            for (list, new) in [
                (&mut unit.names, entry.names),
                (&mut unit.symbols, entry.symbols),
                (&mut unit.aliases, entry.aliases),
            ] {
                if let Some(new) = new {
                    join_list(list, new, precedence);
                }
            }

            self.reindex(id)?;
        }
        Ok(())
    }

    /// Remove the keys of a unit and of the units generated from it
    fn unindex(&mut self, id: usize) {
        if let Origin::Declared {
            prefixed: Some(ids),
            ..
        } = &self.units[id].origin
        {
            for &prefixed in ids.values() {
                self.index.remove_unit(&self.units[prefixed].unit);
            }
        }
        self.index.remove_unit(&self.units[id].unit);
    }

    /// Add back the keys of an edited unit, regenerating its prefixed units
    fn reindex(&mut self, id: usize) -> Result<(), ConverterBuilderError> {
        if let Origin::Declared {
            prefixed: Some(ids),
            ..
        } = self.units[id].origin.clone()
        {
            for (prefix, mut unit) in self.si.prefixed_units(&self.units[id].unit)? {
                let target = &mut self.units[ids[prefix]].unit;
                // aliases of prefixed units are set by extends, keep them
                unit.aliases = std::mem::take(&mut target.aliases);
                *target = unit;
                self.index.add_unit(target, ids[prefix])?;
            }
        }
        self.index.add_unit(&self.units[id].unit, id)?;
        Ok(())
    }
}

fn group_dimension(group: &QuantityGroup) -> Result<Dimension, ConverterBuilderError> {
    if let Some(exponents) = &group.dimension {
        return Ok(Dimension::from_exponents(exponents));
    }
    group
        .quantity
        .parse::<BaseQuantity>()
        .map(Dimension::of)
        .map_err(|_| ConverterBuilderError::UnknownDimension {
            quantity: group.quantity.clone(),
        })
}

fn join_list<T>(current: &mut Vec<T>, mut new: Vec<T>, precedence: Precedence) {
    match precedence {
        Precedence::Before => {
            new.append(current);
            *current = new;
        }
        Precedence::After => current.append(&mut new),
        Precedence::Override => *current = new,
    }
}

impl SI {
    /// Layer another SI configuration on top of this one
    fn merge(&mut self, other: SI) {
        let precedence = other.precedence;
        for (current, new) in [
            (&mut self.prefixes, other.prefixes),
            (&mut self.symbol_prefixes, other.symbol_prefixes),
        ] {
            let Some(new) = new else { continue };
            if let Some(current) = current.as_mut() {
                for (prefix, list) in new {
                    join_list(&mut current[prefix], list, precedence);
                }
            } else {
                *current = Some(new);
            }
        }
        self.precedence = precedence;
    }

    /// Units generated from `base` with every prefix
    ///
    /// Names get the name prefixes and symbols the symbol prefixes. Aliases
    /// are never prefixed.
    fn prefixed_units(&self, base: &Unit) -> Result<Vec<(SIPrefix, Unit)>, ConverterBuilderError> {
        let (Some(prefixes), Some(symbol_prefixes)) = (&self.prefixes, &self.symbol_prefixes)
        else {
            return Err(ConverterBuilderError::EmptySIPrefixes);
        };
        let combine = |pre: &[String], keys: &[Arc<str>]| -> Vec<Arc<str>> {
            pre.iter()
                .flat_map(|p| keys.iter().map(move |k| Arc::from(format!("{p}{k}"))))
                .collect()
        };
        let units = prefixes
            .iter()
            .map(|(prefix, name_prefixes)| {
                let unit = Unit {
                    names: combine(name_prefixes, &base.names),
                    symbols: combine(&symbol_prefixes[prefix], &base.symbols),
                    aliases: Vec::new(),
                    ratio: base.ratio * prefix.ratio(),
                    difference: base.difference,
                    quantity: Arc::clone(&base.quantity),
                    dimension: base.dimension.clone(),
                };
                (prefix, unit)
            })
            .collect();
        Ok(units)
    }
}

impl UnitIndex {
    fn remove_unit(&mut self, unit: &Unit) {
        for key in unit.all_keys() {
            self.0.remove(key);
        }
    }

    /// Index every key of `unit`
    ///
    /// Nothing is inserted if any key is empty or already taken.
    pub(super) fn add_unit(&mut self, unit: &Unit, id: usize) -> Result<usize, ConverterBuilderError> {
        let keys: Vec<&Arc<str>> = unit.all_keys().collect();
        if keys.is_empty() {
            return Err(ConverterBuilderError::EmptyUnit {
                unit: unit.clone().into(),
            });
        }
        for (i, key) in keys.iter().enumerate() {
            if key.trim().is_empty() {
                return Err(ConverterBuilderError::EmptyUnitKey {
                    unit: unit.clone().into(),
                });
            }
            if self.0.contains_key(*key) || keys[..i].contains(key) {
                return Err(ConverterBuilderError::DuplicateUnit {
                    name: key.to_string(),
                });
            }
        }
        for key in &keys {
            self.0.insert(Arc::clone(key), id);
        }
        Ok(keys.len())
    }
}

/// Errors generated by [`ConverterBuilder`]
#[derive(Debug, Error)]
pub enum ConverterBuilderError {
    #[error("Duplicate unit: {name}")]
    DuplicateUnit { name: String },

    #[error("Duplicate unit in extend, another key points to the same unit: {key}")]
    DuplicateExtendUnit { key: String },

    #[error("Can only edit aliases in auto expanded unit: {key}")]
    InvalidExtendExpanded { key: String },

    #[error(transparent)]
    UnknownUnit(#[from] UnknownUnit),

    #[error("Unit without names or symbols in {}", unit.quantity)]
    EmptyUnit { unit: Box<Unit> },

    #[error("Unit with an empty name, symbol or alias in {}", unit.quantity)]
    EmptyUnitKey { unit: Box<Unit> },

    #[error("Quantity '{quantity}' is not a base quantity and has no dimension")]
    UnknownDimension { quantity: String },

    #[error("No SI prefixes found when expanding SI on a unit")]
    EmptySIPrefixes,
}
