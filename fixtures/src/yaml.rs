//! YAML rendering for the accountability monitor
//!
//! The layout (comments, indentation, blank lines) is what the monitor and
//! validator processes already parse, so it is produced verbatim rather than
//! through a generic serializer.

use crate::fixture::{MonitorFixture, RoundSection, ValidatorFixture, VoteRecord};

const DOCUMENT_HEADER: &str = "--- # auto-generated config file\n";

/// Render the shared monitor file
pub fn render_monitor(monitor: &MonitorFixture) -> String {
    let mut out = String::new();

    out.push_str(DOCUMENT_HEADER);
    out.push_str(&format!("height: {}\n", monitor.height));
    out.push_str(&format!("firstDecisionRound: {}\n", monitor.first_decision_round));
    out.push_str(&format!("secondDecisionRound: {}\n", monitor.second_decision_round));
    out.push_str(&format!("timeout: {}\n", monitor.timeout));
    out.push_str("# each validator must have a unique address (it is used as id)\n");
    out.push_str("validators:\n");

    for address in &monitor.validators {
        out.push_str(&format!("  - {}\n", address));
    }

    out
}

/// Render the header and every round section of one validator file
pub fn render_validator(fixture: &ValidatorFixture) -> String {
    let mut out = String::new();

    out.push_str(DOCUMENT_HEADER);
    out.push_str(&format!("id: {}\n", fixture.id));
    out.push_str(&format!("address: {}\n", fixture.address));
    out.push_str("messages:\n");
    out.push_str("  # height\n");
    out.push_str(&format!("  {}:\n", fixture.height));
    out.push_str("    heightvoteset:\n");

    for section in &fixture.rounds {
        render_round(&mut out, section);
    }

    out
}

fn render_round(out: &mut String, section: &RoundSection) {
    out.push_str(&format!("\n      # round\n      {}:\n", section.round));

    let lists = [
        ("received_prevote", &section.received_prevote),
        ("sent_prevote", &section.sent_prevote),
        ("received_precommit", &section.received_precommit),
        ("sent_precommit", &section.sent_precommit),
    ];

    for (name, records) in lists {
        out.push_str(&format!("\n        {}:", name));
        for record in records {
            render_record(out, record);
        }
    }
}

fn render_record(out: &mut String, record: &VoteRecord) {
    out.push_str(&format!("\n          - type: {}\n", record.message_type));
    out.push_str(&format!("            sender: {}\n", record.sender));
    out.push_str(&format!("            round: {}\n", record.round));
    out.push_str("            value:\n");
    out.push_str(&format!("              data: {}\n", record.value));
}
