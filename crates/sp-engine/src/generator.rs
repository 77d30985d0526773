//! Starter seeding plan generation from org describes

use crate::error::{EngineError, EngineResult};
use serde_json::Value;
use sp_core::token::{reference_token, synthetic_expression, COUNTER_TOKEN};
use sp_core::{prepare_steps, CycleDecider, PreparedPlan, SObjectName, SeedingStep};
use sp_org::{FieldDescribe, FieldType, Org, SObjectDescribe};
use std::collections::BTreeSet;

/// Field name fragments mapped to the synthetic generator that fits them
const NAME_HINTS: &[(&str, &str)] = &[
    ("email", "internet.email"),
    ("firstname", "name.firstName"),
    ("lastname", "name.lastName"),
    ("phone", "phone.number"),
    ("fax", "phone.number"),
    ("title", "name.jobTitle"),
    ("street", "address.streetAddress"),
    ("city", "address.city"),
    ("postalcode", "address.zipCode"),
    ("zip", "address.zipCode"),
    ("country", "address.country"),
    ("state", "address.state"),
    ("website", "internet.url"),
    ("url", "internet.url"),
];

/// Describe every object type and emit one starter step per type.
///
/// Each step gets the type's required fields plus its references to other
/// requested types, filled with placeholder tokens. The steps then go
/// through cycle breaking and sequencing like any loaded plan.
pub async fn generate_plan(
    org: &dyn Org,
    sobjects: &[SObjectName],
    count: u32,
    decider: &mut dyn CycleDecider,
) -> EngineResult<PreparedPlan> {
    let requested: BTreeSet<&str> = sobjects.iter().map(SObjectName::as_str).collect();

    let mut steps = Vec::with_capacity(sobjects.len());
    for sobject in sobjects {
        let describe = org
            .describe(sobject)
            .await
            .map_err(|e| EngineError::step(sobject.as_str(), e))?;
        steps.push(starter_step(&describe, count, &requested));
    }

    Ok(prepare_steps(steps, decider)?)
}

/// One step for a described object type
pub fn starter_step(
    describe: &SObjectDescribe,
    count: u32,
    requested: &BTreeSet<&str>,
) -> SeedingStep {
    let mut step = SeedingStep::new(describe.name.as_str(), count);

    for field in &describe.fields {
        if !field.createable || field.name.eq_ignore_ascii_case("id") {
            continue;
        }
        let value = if field.is_reference() {
            reference_placeholder(describe, field, requested)
        } else if field.is_required_on_create() {
            Some(placeholder(&describe.name, field))
        } else {
            None
        };
        if let Some(value) = value {
            step.fields.insert(field.name.clone(), value);
        }
    }

    step
}

fn reference_placeholder(
    describe: &SObjectDescribe,
    field: &FieldDescribe,
    requested: &BTreeSet<&str>,
) -> Option<Value> {
    let in_plan = field
        .reference_to
        .iter()
        .find(|target| requested.contains(target.as_str()) && **target != describe.name);

    let target = match in_plan {
        Some(target) => target,
        None if field.is_required_on_create() => {
            let target = field.reference_to.first()?;
            log::warn!(
                "{}.{} requires a {} which is not being generated",
                describe.name,
                field.name,
                target
            );
            target
        }
        None => return None,
    };
    Some(Value::String(reference_token(target, "Id")))
}

/// Type-driven placeholder for a non-reference field
fn placeholder(sobject: &str, field: &FieldDescribe) -> Value {
    let synthetic = |path: &str| Value::String(synthetic_expression(path));

    match field.field_type {
        FieldType::Integer | FieldType::Double | FieldType::Currency => synthetic("random.number"),
        FieldType::Date => synthetic("date.future"),
        FieldType::Datetime => synthetic("date.timestamp"),
        FieldType::Boolean => Value::Bool(false),
        FieldType::String | FieldType::Other | FieldType::Reference => {
            if field.name == "Name" {
                return Value::String(format!("{} {}", sobject, COUNTER_TOKEN));
            }
            let lower = field.name.to_ascii_lowercase();
            match NAME_HINTS.iter().find(|(hint, _)| lower.contains(hint)) {
                Some((_, path)) => synthetic(path),
                None => Value::String(format!("{} {}", field.name, COUNTER_TOKEN)),
            }
        }
    }
}
