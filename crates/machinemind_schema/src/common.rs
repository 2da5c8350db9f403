//! Value-level sub-structures shared across entity kinds.
//!
//! These are not entities: they live inline in their holder's record and are
//! never stored, resolved, or insinuated on their own.

use machinemind_foundation::{Error, RawRecord, Result, Value};
use machinemind_registry::Loader;

/// A sub-structure read from one nested record of a list field.
pub trait SubValue: Sized {
    /// Reads the structure from a nested reader.
    ///
    /// # Errors
    ///
    /// Field validation errors from the reader.
    fn read(loader: &Loader<'_>) -> Result<Self>;

    /// Renders the structure back to a nested value.
    fn to_value(&self) -> Value;
}

/// Reads every element of a list-of-records field.
///
/// # Errors
///
/// `TypeMismatch` on malformed elements, or any element's field errors.
pub fn read_all<T: SubValue>(loader: &Loader<'_>, field: &str) -> Result<Vec<T>> {
    loader
        .record_list(field)?
        .iter()
        .map(|rec| T::read(&loader.nested(rec)))
        .collect()
}

/// Renders a slice of sub-structures as a list value.
#[must_use]
pub fn save_all<T: SubValue>(items: &[T]) -> Value {
    Value::List(items.iter().map(SubValue::to_value).collect())
}

fn required_value(loader: &Loader<'_>, field: &str) -> Result<Value> {
    loader
        .value(field)
        .ok_or_else(|| Error::missing_field(loader.kind(), field))
}

/// A numeric stat modifier applied to a pilot or mech (`{id, val}`).
#[derive(Clone, Debug, PartialEq)]
pub struct Bonus {
    /// Which stat the bonus applies to (e.g. `pilot_hp`).
    pub id: String,
    /// Amount; a number or a formula string.
    pub val: Value,
}

impl Bonus {
    /// Creates a bonus.
    pub fn new(id: impl Into<String>, val: impl Into<Value>) -> Self {
        Self {
            id: id.into(),
            val: val.into(),
        }
    }
}

impl SubValue for Bonus {
    fn read(loader: &Loader<'_>) -> Result<Self> {
        Ok(Self {
            id: loader.string("id")?,
            val: required_value(loader, "val")?,
        })
    }

    fn to_value(&self) -> Value {
        RawRecord::new()
            .with("id", self.id.as_str())
            .with("val", self.val.clone())
            .into_value()
    }
}

/// A discrete action granted by an item.
#[derive(Clone, Debug, PartialEq)]
pub struct Action {
    /// Display name.
    pub name: String,
    /// Activation cost (`Quick`, `Full`, `Reaction`, ...).
    pub activation: String,
    /// Rules text.
    pub detail: String,
    /// Trigger condition, for reactions.
    pub trigger: Option<String>,
    /// Usage frequency (e.g. `1/round`).
    pub frequency: Option<String>,
}

impl SubValue for Action {
    fn read(loader: &Loader<'_>) -> Result<Self> {
        Ok(Self {
            name: loader.string_or("name", "")?,
            activation: loader.string_or("activation", "Quick")?,
            detail: loader.string_or("detail", "")?,
            trigger: loader.opt_string("trigger")?,
            frequency: loader.opt_string("frequency")?,
        })
    }

    fn to_value(&self) -> Value {
        RawRecord::new()
            .with("name", self.name.as_str())
            .with("activation", self.activation.as_str())
            .with("detail", self.detail.as_str())
            .with("trigger", self.trigger.clone())
            .with("frequency", self.frequency.clone())
            .into_value()
    }
}

/// Rules text that surfaces in particular UI locations.
#[derive(Clone, Debug, PartialEq)]
pub struct Synergy {
    /// Locations the synergy shows up in (e.g. `move`, `weapon`).
    pub locations: Vec<String>,
    /// Rules text.
    pub detail: String,
}

impl SubValue for Synergy {
    fn read(loader: &Loader<'_>) -> Result<Self> {
        Ok(Self {
            locations: loader.string_list("locations")?,
            detail: loader.string_or("detail", "")?,
        })
    }

    fn to_value(&self) -> Value {
        RawRecord::new()
            .with("locations", self.locations.clone())
            .with("detail", self.detail.as_str())
            .into_value()
    }
}

/// A tracked numeric resource (ammo, charges).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Counter {
    /// Identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Lower bound.
    pub min: i64,
    /// Upper bound, if any.
    pub max: Option<i64>,
    /// Value on reset.
    pub default_value: i64,
    /// Current value.
    pub value: i64,
}

impl Counter {
    /// Sets the value, clamped to the counter's bounds.
    pub fn set(&mut self, value: i64) {
        let floored = value.max(self.min);
        self.value = self.max.map_or(floored, |max| floored.min(max));
    }

    /// Restores the default value.
    pub fn reset(&mut self) {
        self.set(self.default_value);
    }
}

impl SubValue for Counter {
    fn read(loader: &Loader<'_>) -> Result<Self> {
        let min = loader.int_or("min", 0)?;
        let default_value = loader.int_or("default_value", min)?;
        Ok(Self {
            id: loader.string_or("id", "")?,
            name: loader.string_or("name", "")?,
            min,
            max: loader.opt_int("max")?,
            default_value,
            value: loader.int_or("value", default_value)?,
        })
    }

    fn to_value(&self) -> Value {
        RawRecord::new()
            .with("id", self.id.as_str())
            .with("name", self.name.as_str())
            .with("min", self.min)
            .with("max", self.max)
            .with("default_value", self.default_value)
            .with("value", self.value)
            .into_value()
    }
}

/// A typed damage amount (`{type, val}`).
#[derive(Clone, Debug, PartialEq)]
pub struct Damage {
    /// Damage type (`Kinetic`, `Energy`, `Explosive`, `Heat`, `Burn`).
    pub kind: String,
    /// Amount; a number or a dice string.
    pub val: Value,
}

impl SubValue for Damage {
    fn read(loader: &Loader<'_>) -> Result<Self> {
        Ok(Self {
            kind: loader.string_or("type", "Kinetic")?,
            val: required_value(loader, "val")?,
        })
    }

    fn to_value(&self) -> Value {
        RawRecord::new()
            .with("type", self.kind.as_str())
            .with("val", self.val.clone())
            .into_value()
    }
}

/// A typed range (`{type, val}`).
#[derive(Clone, Debug, PartialEq)]
pub struct Range {
    /// Range type (`Range`, `Threat`, `Line`, `Cone`, `Blast`, `Burst`, ...).
    pub kind: String,
    /// Distance; a number or a formula string.
    pub val: Value,
}

impl SubValue for Range {
    fn read(loader: &Loader<'_>) -> Result<Self> {
        Ok(Self {
            kind: loader.string_or("type", "Range")?,
            val: required_value(loader, "val")?,
        })
    }

    fn to_value(&self) -> Value {
        RawRecord::new()
            .with("type", self.kind.as_str())
            .with("val", self.val.clone())
            .into_value()
    }
}

/// The action/bonus/synergy/counter block most equipment carries.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Effects {
    /// Granted actions.
    pub actions: Vec<Action>,
    /// Stat bonuses.
    pub bonuses: Vec<Bonus>,
    /// Contextual rules text.
    pub synergies: Vec<Synergy>,
    /// Tracked resources.
    pub counters: Vec<Counter>,
}

impl Effects {
    /// Reads the block from the conventional field names.
    ///
    /// # Errors
    ///
    /// Field validation errors.
    pub fn load(loader: &Loader<'_>) -> Result<Self> {
        Ok(Self {
            actions: read_all(loader, "actions")?,
            bonuses: read_all(loader, "bonuses")?,
            synergies: read_all(loader, "synergies")?,
            counters: read_all(loader, "counters")?,
        })
    }

    /// Writes the block into `record`.
    #[must_use]
    pub fn save_into(&self, record: RawRecord) -> RawRecord {
        record
            .with("actions", save_all(&self.actions))
            .with("bonuses", save_all(&self.bonuses))
            .with("synergies", save_all(&self.synergies))
            .with("counters", save_all(&self.counters))
    }
}

/// Renders a float as an integer value when it has no fractional part.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        Value::Int(n as i64)
    } else {
        Value::Float(n)
    }
}
