use crate::tracker::GraphTracker;
use crate::value::Value;

/// Performs a strict deep equality check between two values.
///
/// Unlike equivalency, this never consults options: types must match exactly,
/// sequences compare in order, objects compare every field. Dictionary key
/// order is ignored. Identical references are equal without descending, and a
/// reference pair met again along a cycle is assumed equal.
///
/// # Examples
///
/// ```
/// use equivalency::{deep_equal, Seq, Value};
///
/// let a = Value::from(Seq::of([1, 2, 3]));
/// let b = Value::from(Seq::of([1, 2, 3]));
/// let c = Value::from(Seq::of([3, 2, 1]));
///
/// assert!(deep_equal(&a, &b));
/// assert!(!deep_equal(&a, &c));
/// ```
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    deep_equal_tracked(a, b, &mut GraphTracker::new())
}

fn deep_equal_tracked(a: &Value, b: &Value, tracker: &mut GraphTracker) -> bool {
    if a.same_reference(b) {
        return true;
    }
    if !tracker.enter(a, b) {
        return true;
    }

    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Int(a), Value::Int(b)) => a == b,
        (Value::Float(a), Value::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
        (Value::Str(a), Value::Str(b)) => a == b,
        (Value::Enum(a), Value::Enum(b)) => a.ty().same_as(b.ty()) && a.value() == b.value(),

        (Value::Seq(seq_a), Value::Seq(seq_b)) => {
            let items_a = seq_a.items();
            let items_b = seq_b.items();
            if items_a.len() != items_b.len() {
                return false;
            }
            items_a
                .iter()
                .zip(&items_b)
                .all(|(x, y)| deep_equal_tracked(x, y, tracker))
        }

        (Value::Dict(dict_a), Value::Dict(dict_b)) => {
            if dict_a.len() != dict_b.len() {
                return false;
            }
            for (key, val_a) in dict_a.entries() {
                match dict_b.get(&key) {
                    Some(val_b) => {
                        if !deep_equal_tracked(&val_a, &val_b, tracker) {
                            return false;
                        }
                    }
                    None => return false,
                }
            }
            true
        }

        (Value::Object(obj_a), Value::Object(obj_b)) => {
            if !obj_a.ty().same_as(obj_b.ty()) {
                return false;
            }
            let fields_a = obj_a.fields();
            let fields_b = obj_b.fields();
            if fields_a.len() != fields_b.len() {
                return false;
            }
            for (name, val_a) in &fields_a {
                match obj_b.get(name) {
                    Some(val_b) => {
                        if !deep_equal_tracked(val_a, &val_b, tracker) {
                            return false;
                        }
                    }
                    None => return false,
                }
            }
            true
        }

        // Different shapes are never equal
        _ => false,
    }
}
