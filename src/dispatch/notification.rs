//! Per-send notification value.

// self
use crate::_prelude::*;

/// Prefix applied to payload keys on the wire.
pub const DATA_PREFIX: &str = "data.";

/// A single notification addressed to one device.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
	/// Device registration id.
	pub device_id: String,
	/// Key the push service uses to coalesce queued duplicates.
	pub collapse_key: String,
	/// Payload entries, delivered to the device as `data.<key>` extras.
	#[serde(default)]
	pub data: BTreeMap<String, String>,
	/// Ask the service to hold the message until the device is active.
	#[serde(default)]
	pub delay_while_idle: bool,
}
impl Notification {
	/// Creates a notification with an empty payload.
	pub fn new(device_id: impl Into<String>, collapse_key: impl Into<String>) -> Self {
		Self {
			device_id: device_id.into(),
			collapse_key: collapse_key.into(),
			data: BTreeMap::new(),
			delay_while_idle: false,
		}
	}

	/// Adds or replaces one payload entry.
	pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.data.insert(key.into(), value.into());

		self
	}

	/// Adds or replaces several payload entries.
	pub fn extend_data<I, K, V>(mut self, entries: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		self.data.extend(entries.into_iter().map(|(key, value)| (key.into(), value.into())));

		self
	}

	/// Toggles `delay_while_idle`.
	pub fn delay_while_idle(mut self, delay: bool) -> Self {
		self.delay_while_idle = delay;

		self
	}

	/// Form fields submitted to the push endpoint.
	pub fn form_fields(&self) -> Vec<(String, String)> {
		let mut fields = Vec::with_capacity(self.data.len() + 3);

		fields.push(("registration_id".into(), self.device_id.clone()));
		fields.push(("collapse_key".into(), self.collapse_key.clone()));

		if self.delay_while_idle {
			fields.push(("delay_while_idle".into(), "1".into()));
		}

		fields.extend(
			self.data.iter().map(|(key, value)| (format!("{DATA_PREFIX}{key}"), value.clone())),
		);

		fields
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn form_fields_prefix_payload_keys() {
		let fields = Notification::new("device-1", "updates")
			.with_data("Alert", "disk full")
			.with_data("alert", "lower case is distinct")
			.form_fields();

		assert_eq!(
			fields,
			vec![
				("registration_id".to_owned(), "device-1".to_owned()),
				("collapse_key".to_owned(), "updates".to_owned()),
				("data.Alert".to_owned(), "disk full".to_owned()),
				("data.alert".to_owned(), "lower case is distinct".to_owned()),
			]
		);
	}

	#[test]
	fn repeated_keys_replace_values_and_idle_flag_is_optional() {
		let notification = Notification::new("device-1", "updates")
			.extend_data([("k", "v1"), ("k", "v2")])
			.delay_while_idle(true);
		let fields = notification.form_fields();

		assert_eq!(notification.data.len(), 1);
		assert!(fields.contains(&("data.k".to_owned(), "v2".to_owned())));
		assert!(fields.contains(&("delay_while_idle".to_owned(), "1".to_owned())));
	}
}
