//! Node bindings for the mortgage engine.
//!
//! The web layer calls these with a self-contained request: the mortgage's
//! stored records plus the window (and a scenario for simulations). JSON
//! string in, JSON string out; the engine's error kinds surface as rejected
//! promises with the structured message.

use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;

use mortgage_core::period::PeriodKey;
use mortgage_core::scenario::Scenario;
use mortgage_core::store::MortgageRecords;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

#[derive(Deserialize)]
struct PlanRequest {
    records: MortgageRecords,
    from_period: String,
    months: u32,
}

#[derive(Deserialize)]
struct SimulationRequest {
    records: MortgageRecords,
    from_period: String,
    months: u32,
    #[serde(default)]
    scenario: Scenario,
}

#[napi]
pub fn get_plan(input_json: String) -> NapiResult<String> {
    let request: PlanRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let from: PeriodKey = request.from_period.parse().map_err(to_napi_error)?;
    let output = mortgage_core::engine::plan_for_records(&request.records, from, request.months)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn simulate(input_json: String) -> NapiResult<String> {
    let request: SimulationRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let from: PeriodKey = request.from_period.parse().map_err(to_napi_error)?;
    let output = mortgage_core::engine::simulate_for_records(
        &request.records,
        from,
        request.months,
        &request.scenario,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
