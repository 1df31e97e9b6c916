//! ---
//! hearth_section: "06-security-access-control"
//! hearth_subsection: "module"
//! hearth_type: "source"
//! hearth_scope: "code"
//! hearth_description: "Authorization pipeline, identity, and policy engines."
//! hearth_version: "v0.0.0-prealpha"
//! hearth_owner: "tbd"
//! ---
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::AccessError;

/// Stateful entity kinds with a fixed lifecycle graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum EntityKind {
    /// Property lifecycle.
    Property,
    /// Maintenance ticket lifecycle.
    Ticket,
}

/// Property lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum PropertyState {
    /// Not yet assigned to a manager.
    Unassigned,
    /// Being prepared for listing.
    Onboarding,
    /// Publicly listed for rent.
    Listed,
    /// Under an active tenancy.
    Occupied,
    /// Undergoing maintenance work.
    MaintenanceActive,
    /// Withdrawn from the platform.
    Inactive,
}

impl PropertyState {
    /// Legal next states; self-transition is always legal and not listed.
    pub fn successors(self) -> &'static [PropertyState] {
        use PropertyState::*;
        match self {
            Unassigned => &[Onboarding],
            Onboarding => &[Listed, Inactive],
            Listed => &[Occupied, MaintenanceActive, Inactive],
            Occupied => &[Listed, MaintenanceActive, Inactive],
            MaintenanceActive => &[Listed, Occupied],
            Inactive => &[Onboarding, Listed],
        }
    }
}

/// Maintenance ticket lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum TicketState {
    /// Reported, no vendor yet.
    Open,
    /// A vendor has been assigned.
    VendorAssigned,
    /// The vendor submitted a quotation.
    QuotationSubmitted,
    /// Quotation awaiting owner/manager approval.
    AwaitingApproval,
    /// Approved work in progress.
    InProgress,
    /// Work finished, pending closure.
    Completed,
    /// Closed; terminal.
    Closed,
}

impl TicketState {
    /// Legal next states; self-transition is always legal and not listed.
    pub fn successors(self) -> &'static [TicketState] {
        use TicketState::*;
        match self {
            Open => &[VendorAssigned, Closed],
            VendorAssigned => &[QuotationSubmitted, Open],
            QuotationSubmitted => &[AwaitingApproval],
            AwaitingApproval => &[InProgress, QuotationSubmitted, Closed],
            InProgress => &[Completed],
            Completed => &[Closed],
            Closed => &[],
        }
    }
}

fn invalid(entity: EntityKind, from: impl fmt::Display, to: impl fmt::Display) -> AccessError {
    AccessError::InvalidTransition {
        entity: entity.to_string(),
        from: from.to_string(),
        to: to.to_string(),
    }
}

/// Validate a property lifecycle move.
pub fn validate_property_transition(
    current: PropertyState,
    target: PropertyState,
) -> Result<(), AccessError> {
    if current == target || current.successors().contains(&target) {
        return Ok(());
    }
    Err(invalid(EntityKind::Property, current, target))
}

/// Validate a ticket lifecycle move.
pub fn validate_ticket_transition(
    current: TicketState,
    target: TicketState,
) -> Result<(), AccessError> {
    if current == target || current.successors().contains(&target) {
        return Ok(());
    }
    Err(invalid(EntityKind::Ticket, current, target))
}

/// Validate a lifecycle move given state labels.
///
/// Labels are normalized case-insensitively to the canonical
/// SCREAMING_SNAKE_CASE form. Labels outside the machine's state set are
/// rejected the same way an illegal edge is, naming both states.
pub fn validate_transition(
    entity: EntityKind,
    current: &str,
    target: &str,
) -> Result<(), AccessError> {
    let illegal = || AccessError::InvalidTransition {
        entity: entity.to_string(),
        from: current.to_owned(),
        to: target.to_owned(),
    };
    match entity {
        EntityKind::Property => {
            let from = PropertyState::from_str(current).map_err(|_| illegal())?;
            let to = PropertyState::from_str(target).map_err(|_| illegal())?;
            validate_property_transition(from, to)
        }
        EntityKind::Ticket => {
            let from = TicketState::from_str(current).map_err(|_| illegal())?;
            let to = TicketState::from_str(target).map_err(|_| illegal())?;
            validate_ticket_transition(from, to)
        }
    }
}
