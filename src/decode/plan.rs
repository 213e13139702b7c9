//! Plan-graph decoding: plans, pastures, plant communities, schedules,
//! minister issues.

use serde_json::Value;

use super::value::{entries, opt_bool, opt_f64, opt_i64, opt_str, opt_utc_date};
use crate::model::pasture::{
    IndicatorPlant, MonitoringArea, Pasture, PastureAction, PlantCommunity, PurposeOfAction,
};
use crate::model::plan::{
    AdditionalRequirement, LivestockId, MinisterIssue, MinisterIssueAction, Plan, PlanStatus,
};
use crate::model::schedule::{Schedule, ScheduleEntry};
use crate::model::Agreement;

/// Decode a downloaded plan and attach it to its agreement's identity.
///
/// The remote status id is carried as-is; it is resolved against the
/// PLAN_STATUS reference table when the plan is stored.
pub fn decode_plan(node: &Value, agreement: &Agreement) -> Plan {
    let mut plan = Plan::new(&agreement.agreement_id);
    plan.set_from_agreement(agreement);
    plan.status = PlanStatus::Unknown;
    plan.remote_id = opt_i64(node, "id");
    plan.remote_status_id = opt_i64(node, "statusId");

    if let Some(name) = opt_str(node, "rangeName") {
        plan.range_name = name;
    }
    if let Some(name) = opt_str(node, "altBusinessName") {
        plan.alt_business_name = name;
    }
    if let Some(start) = opt_utc_date(node, "planStartDate") {
        plan.plan_start = Some(start);
    }
    if let Some(end) = opt_utc_date(node, "planEndDate") {
        plan.plan_end = Some(end);
    }
    if let Some(notes) = opt_str(node, "notes") {
        plan.notes = notes;
    }

    for pasture in entries(&node["pastures"]) {
        plan.pastures.push(decode_pasture(pasture));
    }
    for schedule in entries(&node["grazingSchedules"]) {
        plan.schedules.push(decode_schedule(schedule));
    }
    let mut issues = Vec::new();
    for issue in entries(&node["ministerIssues"]) {
        issues.push(decode_minister_issue(issue, &plan.pastures));
    }
    plan.minister_issues = issues;
    for requirement in entries(&node["additionalRequirements"]) {
        plan.additional_requirements
            .push(decode_additional_requirement(requirement));
    }
    for livestock_id in entries(&node["livestockIdentifiers"]) {
        plan.livestock_ids.push(decode_livestock_id(livestock_id));
    }

    plan
}

pub fn decode_pasture(node: &Value) -> Pasture {
    let mut pasture = Pasture::new();
    pasture.remote_id = opt_i64(node, "id");

    if let Some(name) = opt_str(node, "name") {
        pasture.name = name;
    }
    if let Some(aums) = opt_i64(node, "allowableAum") {
        pasture.allowed_aums = aums;
    }
    if let Some(pld) = opt_f64(node, "pldPercent") {
        pasture.private_land_deduction = pld;
    }
    if let Some(days) = opt_i64(node, "graceDays") {
        pasture.grace_days = days;
    }
    if let Some(notes) = opt_str(node, "notes") {
        pasture.notes = notes;
    }

    for community in entries(&node["plantCommunities"]) {
        pasture.plant_communities.push(decode_plant_community(community));
    }

    pasture
}

pub fn decode_plant_community(node: &Value) -> PlantCommunity {
    let mut community = PlantCommunity::new();
    community.remote_id = opt_i64(node, "id");

    if let Some(name) = opt_str(node, "name") {
        community.name = name;
    }
    if let Some(shrub_use) = opt_f64(node, "shrubUse") {
        community.shrub_use = shrub_use;
    }
    if let Some(notes) = opt_str(node, "notes") {
        community.notes = notes;
    }
    if let Some(aspect) = opt_str(node, "aspect") {
        community.aspect = aspect;
    }
    if let Some(url) = opt_str(node, "url") {
        community.url = url;
    }
    if let Some(approved) = opt_bool(node, "approved") {
        community.approved_by_minister = approved;
    }
    if let Some(month) = opt_i64(node, "rangeReadinessMonth") {
        community.readiness_month = month;
    }
    if let Some(day) = opt_i64(node, "rangeReadinessDay") {
        community.readiness_day = day;
    }
    if let Some(notes) = opt_str(node, "rangeReadinessNote") {
        community.readiness_notes = notes;
    }
    if let Some(purpose) = opt_str(node, "purposeOfAction") {
        community.purpose_of_action = PurposeOfAction::from_remote(&purpose);
    }
    // Elevation arrives as a nested lookup row
    if let Some(elevation) = opt_str(&node["elevation"], "name") {
        community.elevation = elevation;
    }

    for plant in entries(&node["indicatorPlants"]) {
        let Some(criteria) = opt_str(plant, "criteria") else {
            continue;
        };
        match criteria.to_lowercase().as_str() {
            "rangereadiness" => community.range_readiness.push(decode_indicator_plant(plant)),
            "stubbleheight" => community.stubble_height.push(decode_indicator_plant(plant)),
            // shrub use indicators are not stored
            _ => {}
        }
    }

    for action in entries(&node["plantCommunityActions"]) {
        community.pasture_actions.push(decode_pasture_action(action));
    }
    for area in entries(&node["monitoringAreas"]) {
        community.monitoring_areas.push(decode_monitoring_area(area));
    }

    community
}

pub fn decode_indicator_plant(node: &Value) -> IndicatorPlant {
    let mut plant = IndicatorPlant::new(&opt_str(node, "criteria").unwrap_or_default());
    plant.remote_id = opt_i64(node, "id");
    if let Some(name) = opt_str(node, "name") {
        plant.name = name;
    }
    if let Some(value) = opt_f64(node, "value") {
        plant.value = value;
    }
    plant
}

pub fn decode_monitoring_area(node: &Value) -> MonitoringArea {
    let mut area = MonitoringArea::new();
    area.remote_id = opt_i64(node, "id");
    if let Some(name) = opt_str(node, "name") {
        area.name = name;
    }
    if let Some(location) = opt_str(node, "location") {
        area.location = location;
    }
    if let Some(purpose) = opt_str(node, "purpose") {
        area.purpose = purpose;
    }
    area
}

pub fn decode_pasture_action(node: &Value) -> PastureAction {
    let mut action = PastureAction::new();
    action.remote_id = opt_i64(node, "id");
    if let Some(name) = opt_str(node, "action") {
        action.action = name;
    }
    if let Some(details) = opt_str(node, "details") {
        action.details = details;
    }
    if let Some(day) = opt_i64(node, "noGrazeStartDay") {
        action.no_graze_start_day = day;
    }
    if let Some(month) = opt_i64(node, "noGrazeStartMonth") {
        action.no_graze_start_month = month;
    }
    if let Some(day) = opt_i64(node, "noGrazeEndDay") {
        action.no_graze_end_day = day;
    }
    if let Some(month) = opt_i64(node, "noGrazeEndMonth") {
        action.no_graze_end_month = month;
    }
    action
}

pub fn decode_schedule(node: &Value) -> Schedule {
    let mut schedule = Schedule::new(opt_i64(node, "year").unwrap_or(0));
    schedule.remote_id = opt_i64(node, "id");
    if let Some(notes) = opt_str(node, "narative") {
        schedule.notes = notes;
    }
    for entry in entries(&node["grazingScheduleEntries"]) {
        schedule.entries.push(decode_schedule_entry(entry));
    }
    schedule
}

pub fn decode_schedule_entry(node: &Value) -> ScheduleEntry {
    let mut entry = ScheduleEntry::new();
    if let Some(type_id) = opt_i64(node, "livestockTypeId") {
        entry.livestock_type_id = type_id;
    }
    if let Some(count) = opt_i64(node, "livestockCount") {
        entry.livestock_count = count;
    }
    entry.date_in = opt_utc_date(node, "dateIn");
    entry.date_out = opt_utc_date(node, "dateOut");
    entry
}

pub fn decode_minister_issue(node: &Value, pastures: &[Pasture]) -> MinisterIssue {
    let mut issue = MinisterIssue::new();
    issue.remote_id = opt_i64(node, "id");
    if let Some(type_id) = opt_i64(node, "issueTypeId") {
        issue.issue_type_id = type_id;
    }
    if let Some(details) = opt_str(node, "detail") {
        issue.details = details;
    }
    if let Some(objective) = opt_str(node, "objective") {
        issue.objective = objective;
    }
    // The payload relates issues to pastures by remote id
    if let Some(ids) = node["pastures"].as_array() {
        for remote_id in ids.iter().filter_map(Value::as_i64) {
            if let Some(pasture) = pastures.iter().find(|p| p.remote_id == Some(remote_id)) {
                issue.pasture_local_ids.push(pasture.local_id.clone());
            }
        }
    }
    for action in entries(&node["ministerIssueActions"]) {
        issue.actions.push(decode_minister_issue_action(action));
    }
    issue
}

pub fn decode_minister_issue_action(node: &Value) -> MinisterIssueAction {
    let mut action = MinisterIssueAction::new();
    action.remote_id = opt_i64(node, "id");
    if let Some(type_id) = opt_i64(node, "actionTypeId") {
        action.action_type_id = type_id;
    }
    if let Some(details) = opt_str(node, "detail") {
        action.details = details;
    }
    action
}

pub fn decode_additional_requirement(node: &Value) -> AdditionalRequirement {
    AdditionalRequirement {
        local_id: crate::model::new_local_id(),
        category: opt_str(node, "category").unwrap_or_default(),
        detail: opt_str(node, "detail").unwrap_or_default(),
        url: opt_str(node, "url").unwrap_or_default(),
    }
}

pub fn decode_livestock_id(node: &Value) -> LivestockId {
    LivestockId {
        local_id: crate::model::new_local_id(),
        identifier_type_id: opt_i64(node, "identifierTypeId").unwrap_or(-1),
        number: opt_str(node, "number").unwrap_or_default(),
        description: opt_str(node, "description").unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn purpose_of_action_normalizes_by_substring() {
        let node = json!({"purposeOfAction": "Establish Plant Community"});
        let community = decode_plant_community(&node);
        assert_eq!(community.purpose_of_action, PurposeOfAction::Establish);

        let node = json!({"purposeOfAction": "will MAINTAIN over time"});
        let community = decode_plant_community(&node);
        assert_eq!(community.purpose_of_action, PurposeOfAction::Maintain);

        let node = json!({"purposeOfAction": "none"});
        let community = decode_plant_community(&node);
        assert_eq!(community.purpose_of_action, PurposeOfAction::Clear);
    }

    #[test]
    fn missing_shrub_use_defaults_to_zero() {
        let community = decode_plant_community(&json!({"name": "Upper bench"}));
        assert_eq!(community.shrub_use, 0.0);
        assert_eq!(community.name, "Upper bench");
    }

    #[test]
    fn indicator_plants_route_by_criteria() {
        let node = json!({
            "indicatorPlants": [
                {"criteria": "RangeReadiness", "name": "Bluebunch wheatgrass", "value": 1.5},
                {"criteria": "stubbleheight", "name": "Rough fescue", "value": 12.0},
                {"criteria": "shrubuse", "name": "Willow", "value": 0.2},
                {"name": "no criteria"}
            ]
        });
        let community = decode_plant_community(&node);
        assert_eq!(community.range_readiness.len(), 1);
        assert_eq!(community.stubble_height.len(), 1);
        assert_eq!(community.range_readiness[0].name, "Bluebunch wheatgrass");
    }

    #[test]
    fn elevation_reads_the_nested_lookup_name() {
        let node = json!({"elevation": {"id": 3, "name": "500-699"}});
        let community = decode_plant_community(&node);
        assert_eq!(community.elevation, "500-699");
    }

    #[test]
    fn issue_pastures_resolve_to_local_ids() {
        let mut pasture = Pasture::new();
        pasture.remote_id = Some(9);
        let node = json!({"id": 3, "issueTypeId": 1, "pastures": [9, 44]});

        let issue = decode_minister_issue(&node, &[pasture.clone()]);
        assert_eq!(issue.pasture_local_ids, [pasture.local_id]);
    }

    #[test]
    fn malformed_entry_dates_stay_unset() {
        let entry = decode_schedule_entry(&json!({
            "livestockTypeId": 2,
            "dateIn": "yesterday",
            "dateOut": "2021-06-15T00:00:00.000Z"
        }));
        assert_eq!(entry.date_in, None);
        assert!(entry.date_out.is_some());
    }
}
