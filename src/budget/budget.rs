use std::{fs, path::Path};

use serde_yaml::{Mapping, Value};
use tracing::{debug, info};

use super::{
    breakdown::Breakdown,
    event::{AmountInput, EventRecord},
    period::Period,
};
use crate::{
    dates::{format_date_stamp, DateStamp},
    errors::{BudgetError, Result},
    utils::persistence::write_atomic,
};

const PERIOD_KEY: &str = "PERIOD";
const ITEMS_KEY: &str = "ITEMS";

/// Definition written by `budget_plot init`.
pub const SAMPLE_BUDGET_YAML: &str = "\
PERIOD:
  start: '2021-12-31'
  end: '2022-01-05'
ITEMS:
  cash:
    amount: 200
    frequency: '2021-12-31'
  food:
    amount: -5
    frequency: every day starting 2022-01-01
  commute:
    amount: -1
    frequency: every day starting 2022-01-02 until 2022-01-04
";

/// A period plus the ordered list of recurring events budgeted inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Budget {
    period: Period,
    events: Vec<EventRecord>,
}

impl Budget {
    pub fn new(start: impl DateStamp, end: impl DateStamp) -> Result<Self> {
        Ok(Self::with_period(Period::new(start, end)?))
    }

    pub fn with_period(period: Period) -> Self {
        Self {
            period,
            events: Vec::new(),
        }
    }

    pub fn period(&self) -> &Period {
        &self.period
    }

    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    /// Validates and appends a new event, returning it.
    pub fn add_event(
        &mut self,
        description: &str,
        amount: impl Into<AmountInput>,
        frequency: &str,
    ) -> Result<&EventRecord> {
        let event = EventRecord::new(description, amount, frequency)?;
        Ok(self.push_event(event))
    }

    pub fn push_event(&mut self, event: EventRecord) -> &EventRecord {
        debug!(event = %event, "added event");
        self.events.push(event);
        &self.events[self.events.len() - 1]
    }

    pub fn breakdown(&self) -> Result<Breakdown> {
        Breakdown::calculate(&self.period, &self.events)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        let document: Value = serde_yaml::from_str(text)?;
        Self::from_document(&document)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.to_document())?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let document: Value = serde_json::from_str(text)?;
        Self::from_document(&document)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_document())?)
    }

    /// Loads a definition, choosing JSON for `.json` files and YAML otherwise.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let budget = if is_json(path) {
            Self::from_json(&text)?
        } else {
            Self::from_yaml(&text)?
        };
        info!(
            path = %path.display(),
            events = budget.events.len(),
            period = %budget.period,
            "loaded budget definition"
        );
        Ok(budget)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = if is_json(path) {
            self.to_json()?
        } else {
            self.to_yaml()?
        };
        write_atomic(path, &text)?;
        info!(path = %path.display(), "saved budget definition");
        Ok(())
    }

    fn to_document(&self) -> Value {
        let mut period = Mapping::new();
        period.insert(
            "start".into(),
            format_date_stamp(self.period.start()).into(),
        );
        period.insert("end".into(), format_date_stamp(self.period.end()).into());

        // keyed by description unless descriptions repeat
        let items = if self.has_unique_descriptions() {
            let mut items = Mapping::new();
            for event in &self.events {
                items.insert(
                    event.description().into(),
                    Value::Mapping(event_fields(event, false)),
                );
            }
            Value::Mapping(items)
        } else {
            Value::Sequence(
                self.events
                    .iter()
                    .map(|event| Value::Mapping(event_fields(event, true)))
                    .collect(),
            )
        };

        let mut document = Mapping::new();
        document.insert(PERIOD_KEY.into(), Value::Mapping(period));
        document.insert(ITEMS_KEY.into(), items);
        Value::Mapping(document)
    }

    fn from_document(document: &Value) -> Result<Self> {
        let root = as_mapping("budget", document)?;
        let period = as_mapping(PERIOD_KEY, required(root, PERIOD_KEY, PERIOD_KEY)?)?;
        let start = as_text("start", required(period, "start", PERIOD_KEY)?)?;
        let end = as_text("end", required(period, "end", PERIOD_KEY)?)?;
        let mut budget = Budget::new(start, end)?;

        match required(root, ITEMS_KEY, ITEMS_KEY)? {
            Value::Mapping(items) => {
                for (key, fields) in items {
                    let description = as_text("description", key)?;
                    let fields = as_mapping("item", fields)?;
                    budget.push_event(event_from_fields(description, fields)?);
                }
            }
            Value::Sequence(items) => {
                for fields in items {
                    let fields = as_mapping("item", fields)?;
                    let description =
                        as_text("description", required(fields, "description", "item")?)?;
                    budget.push_event(event_from_fields(description, fields)?);
                }
            }
            Value::Null => {}
            other => {
                return Err(BudgetError::type_mismatch(
                    "ITEMS",
                    "mapping or sequence",
                    kind_of(other),
                ))
            }
        }
        Ok(budget)
    }

    fn has_unique_descriptions(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        self.events.iter().all(|event| seen.insert(event.description()))
    }
}

fn event_fields(event: &EventRecord, with_description: bool) -> Mapping {
    let mut fields = Mapping::new();
    if with_description {
        fields.insert("description".into(), event.description().into());
    }
    fields.insert("amount".into(), event.amount().into());
    fields.insert("frequency".into(), event.frequency().into());
    fields
}

fn event_from_fields(description: &str, fields: &Mapping) -> Result<EventRecord> {
    let amount = as_amount(required(fields, "amount", description)?)?;
    let frequency = as_text("frequency", required(fields, "frequency", description)?)?;
    EventRecord::new(description, amount, frequency)
}

fn required<'a>(mapping: &'a Mapping, key: &'static str, owner: &str) -> Result<&'a Value> {
    mapping
        .get(key)
        .ok_or_else(|| BudgetError::validation(key, owner, format!("missing `{key}` field")))
}

fn as_mapping<'a>(field: &'static str, value: &'a Value) -> Result<&'a Mapping> {
    value
        .as_mapping()
        .ok_or_else(|| BudgetError::type_mismatch(field, "mapping", kind_of(value)))
}

fn as_text<'a>(field: &'static str, value: &'a Value) -> Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| BudgetError::type_mismatch(field, "text", kind_of(value)))
}

fn as_amount(value: &Value) -> Result<AmountInput> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .map(AmountInput::Integer)
            .or_else(|| number.as_f64().map(AmountInput::Float))
            .ok_or_else(|| BudgetError::validation("amount", number.to_string(), "not a number")),
        Value::String(text) => Ok(AmountInput::Text(text.clone())),
        other => Err(BudgetError::type_mismatch(
            "amount",
            "number or text",
            kind_of(other),
        )),
    }
}

fn kind_of(value: &Value) -> String {
    match value {
        Value::Null => "null".into(),
        Value::Bool(flag) => format!("boolean {flag}"),
        Value::Number(number) => format!("number {number}"),
        Value::String(text) => format!("text `{text}`"),
        Value::Sequence(_) => "sequence".into(),
        Value::Mapping(_) => "mapping".into(),
        Value::Tagged(tagged) => format!("tagged value {}", tagged.tag),
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}
