//! Attribute Signatures and Cues
//!
//! A chunk is identified by its attributes: a set of `slot → value` pairs.
//! Identity ignores slot order (`{a: 1, b: 2}` and `{b: 2, a: 1}` are the
//! same chunk) while display keeps the order the caller wrote them in.
//!
//! A [`Cue`] is a partial description used for retrieval. Each cue slot is
//! either matched exactly (filters candidates) or scored by similarity
//! (subtracts a mismatch penalty from activation).

use std::fmt;
use std::hash::{Hash, Hasher};

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

// ============================================================================
// Values
// ============================================================================

/// A slot value.
///
/// Integers and floats are distinct values for identity (`Int(1) != Float(1.0)`),
/// but both are numeric for blending. Floats compare by total order, so they
/// can take part in hashing.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Value {
	/// Slot present without a value
	Null,
	/// Boolean flag
	Bool(bool),
	/// Integer
	Int(i64),
	/// Real number
	Float(OrderedFloat<f64>),
	/// Symbolic value
	Text(String),
}

impl Value {
	/// Numeric view of this value, if it has one.
	#[allow(clippy::cast_precision_loss)]
	#[must_use]
	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Self::Int(i) => Some(*i as f64),
			Self::Float(f) => Some(f.into_inner()),
			_ => None,
		}
	}

	/// Short description of the value's kind, for error messages.
	#[must_use]
	pub fn describe(&self) -> String {
		match self {
			Self::Null => "null".to_string(),
			Self::Bool(b) => format!("bool {b}"),
			Self::Int(i) => format!("int {i}"),
			Self::Float(f) => format!("float {f}"),
			Self::Text(s) => format!("text {s:?}"),
		}
	}
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Null => write!(f, "null"),
			Self::Bool(b) => write!(f, "{b}"),
			Self::Int(i) => write!(f, "{i}"),
			Self::Float(x) => write!(f, "{x}"),
			Self::Text(s) => write!(f, "{s}"),
		}
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Self::Text(value.to_string())
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Self::Text(value)
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<i64> for Value {
	fn from(value: i64) -> Self {
		Self::Int(value)
	}
}

impl From<i32> for Value {
	fn from(value: i32) -> Self {
		Self::Int(i64::from(value))
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Self::Float(OrderedFloat(value))
	}
}

impl<T: Into<Self>> From<Option<T>> for Value {
	fn from(value: Option<T>) -> Self {
		value.map_or(Self::Null, Into::into)
	}
}

// ============================================================================
// Signatures
// ============================================================================

/// An ordered `slot → value` mapping identifying a chunk.
///
/// Equality and hashing are order-insensitive. Setting an existing slot
/// keeps its original position and replaces the value.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Signature {
	slots: Vec<(String, Value)>,
}

impl Signature {
	/// An empty signature.
	#[must_use]
	pub const fn new() -> Self {
		Self { slots: Vec::new() }
	}

	/// Builder-style [`Signature::insert`].
	#[must_use]
	pub fn with(mut self, slot: impl Into<String>, value: impl Into<Value>) -> Self {
		self.insert(slot, value);
		self
	}

	/// Set `slot` to `value`.
	pub fn insert(&mut self, slot: impl Into<String>, value: impl Into<Value>) {
		let slot = slot.into();
		let value = value.into();
		match self.slots.iter_mut().find(|(name, _)| *name == slot) {
			Some(entry) => entry.1 = value,
			None => self.slots.push((slot, value)),
		}
	}

	/// Value stored under `slot`.
	#[must_use]
	pub fn get(&self, slot: &str) -> Option<&Value> {
		self.slots
			.iter()
			.find(|(name, _)| name == slot)
			.map(|(_, value)| value)
	}

	/// Slots in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
		self.slots.iter().map(|(name, value)| (name.as_str(), value))
	}

	/// Number of slots.
	#[must_use]
	pub fn len(&self) -> usize {
		self.slots.len()
	}

	/// Whether the signature has no slots.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.slots.is_empty()
	}

	fn sorted(&self) -> Vec<&(String, Value)> {
		let mut sorted: Vec<&(String, Value)> = self.slots.iter().collect();
		sorted.sort_by(|a, b| a.0.cmp(&b.0));
		sorted
	}
}

impl PartialEq for Signature {
	fn eq(&self, other: &Self) -> bool {
		self.len() == other.len()
			&& self
				.slots
				.iter()
				.all(|(name, value)| other.get(name) == Some(value))
	}
}

impl Eq for Signature {}

impl Hash for Signature {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.len().hash(state);
		for (name, value) in self.sorted() {
			name.hash(state);
			value.hash(state);
		}
	}
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Signature {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		let mut signature = Self::new();
		for (slot, value) in iter {
			signature.insert(slot, value);
		}
		signature
	}
}

impl fmt::Display for Signature {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{{")?;
		for (i, (name, value)) in self.slots.iter().enumerate() {
			if i > 0 {
				write!(f, ", ")?;
			}
			write!(f, "{name}: {value}")?;
		}
		write!(f, "}}")
	}
}

// ============================================================================
// Cues
// ============================================================================

/// How a cue slot constrains candidate chunks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchKind {
	/// Chunk must hold exactly this value
	Exact,
	/// Chunk is penalized by its dissimilarity to this value
	Similar,
}

/// A retrieval cue: a partial description of the chunk being recalled.
///
/// Slots not mentioned in the cue are unconstrained.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Cue {
	slots: Vec<(String, Value, MatchKind)>,
}

impl Cue {
	/// A cue matching every chunk.
	#[must_use]
	pub const fn new() -> Self {
		Self { slots: Vec::new() }
	}

	/// Require `slot` to equal `value`.
	#[must_use]
	pub fn exact(self, slot: impl Into<String>, value: impl Into<Value>) -> Self {
		self.with(slot.into(), value.into(), MatchKind::Exact)
	}

	/// Score `slot` by similarity to `value` instead of filtering on it.
	#[must_use]
	pub fn similar(self, slot: impl Into<String>, value: impl Into<Value>) -> Self {
		self.with(slot.into(), value.into(), MatchKind::Similar)
	}

	fn with(mut self, slot: String, value: Value, kind: MatchKind) -> Self {
		match self.slots.iter_mut().find(|(name, _, _)| *name == slot) {
			Some(entry) => {
				entry.1 = value;
				entry.2 = kind;
			}
			None => self.slots.push((slot, value, kind)),
		}
		self
	}

	/// All cue slots in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &Value, MatchKind)> + '_ {
		self.slots
			.iter()
			.map(|(name, value, kind)| (name.as_str(), value, *kind))
	}

	/// Slots scored by similarity.
	pub fn similarity_slots(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
		self.iter()
			.filter(|(_, _, kind)| *kind == MatchKind::Similar)
			.map(|(name, value, _)| (name, value))
	}

	/// Whether the cue has no slots.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.slots.is_empty()
	}

	/// Check whether a chunk's signature passes this cue's filters.
	///
	/// Exact slots must be present with an equal value. Similarity slots
	/// must be present (there is nothing to score otherwise); when partial
	/// matching is disabled they are treated as exact slots.
	#[must_use]
	pub fn admits(&self, signature: &Signature, partial_matching: bool) -> bool {
		self.slots.iter().all(|(name, value, kind)| {
			match (signature.get(name), kind, partial_matching) {
				(None, _, _) => false,
				(Some(_), MatchKind::Similar, true) => true,
				(Some(found), _, _) => found == value,
			}
		})
	}
}

impl From<Signature> for Cue {
	fn from(signature: Signature) -> Self {
		Self {
			slots: signature
				.slots
				.into_iter()
				.map(|(name, value)| (name, value, MatchKind::Exact))
				.collect(),
		}
	}
}

#[cfg(test)]
mod tests {
	use std::collections::hash_map::DefaultHasher;

	use super::*;

	fn hash_of(signature: &Signature) -> u64 {
		let mut hasher = DefaultHasher::new();
		signature.hash(&mut hasher);
		hasher.finish()
	}

	#[test]
	fn test_identity_ignores_order() {
		let a = Signature::new().with("player", "p2").with("move", "rock");
		let b = Signature::new().with("move", "rock").with("player", "p2");
		assert_eq!(a, b);
		assert_eq!(hash_of(&a), hash_of(&b));
	}

	#[test]
	fn test_display_keeps_order() {
		let a = Signature::new().with("player", "p2").with("move", "rock");
		let b = Signature::new().with("move", "rock").with("player", "p2");
		assert_eq!(a.to_string(), "{player: p2, move: rock}");
		assert_eq!(b.to_string(), "{move: rock, player: p2}");
	}

	#[test]
	fn test_reinsert_keeps_position() {
		let sig = Signature::new()
			.with("a", 1)
			.with("b", 2)
			.with("a", 3);
		assert_eq!(sig.len(), 2);
		assert_eq!(sig.get("a"), Some(&Value::Int(3)));
		assert_eq!(sig.to_string(), "{a: 3, b: 2}");
	}

	#[test]
	fn test_different_values_differ() {
		let a = Signature::new().with("move", "rock");
		let b = Signature::new().with("move", "paper");
		let c = Signature::new().with("move", "rock").with("player", "p1");
		assert_ne!(a, b);
		assert_ne!(a, c);
	}

	#[test]
	fn test_int_and_float_are_distinct_values() {
		assert_ne!(Value::from(1), Value::from(1.0));
		assert_eq!(Value::from(1).as_f64(), Some(1.0));
		assert_eq!(Value::from("x").as_f64(), None);
	}

	#[test]
	fn test_option_maps_none_to_null() {
		let missing: Option<&str> = None;
		assert_eq!(Value::from(missing), Value::Null);
		assert_eq!(Value::from(Some("rock")), Value::from("rock"));
	}

	#[test]
	fn test_cue_exact_filtering() {
		let sig = Signature::new().with("player", "p2").with("move", "rock");
		assert!(Cue::new().admits(&sig, false));
		assert!(Cue::new().exact("player", "p2").admits(&sig, false));
		assert!(!Cue::new().exact("player", "p1").admits(&sig, false));
		assert!(!Cue::new().exact("color", "red").admits(&sig, false));
	}

	#[test]
	fn test_cue_similarity_slots() {
		let sig = Signature::new().with("size", 3.0);
		let cue = Cue::new().similar("size", 5.0);
		// Scored, not filtered, when partial matching is on
		assert!(cue.admits(&sig, true));
		// Falls back to exact matching otherwise
		assert!(!cue.admits(&sig, false));
		// Absent slots cannot be scored
		assert!(!Cue::new().similar("weight", 1.0).admits(&sig, true));
	}

	#[test]
	fn test_null_matches_null() {
		let sig = Signature::new()
			.with("player", "p2")
			.with("ultimate", None::<&str>);
		let cue = Cue::new().exact("ultimate", None::<&str>);
		assert!(cue.admits(&sig, false));
	}
}
