//! Ship commands
//!
//! - `ships ls`: one page of the ship register, optionally fuzzy filtered
//! - `ships search`: server-side lookup by name or IMO
//! - `ships add`: register a ship
//! - `ships rm`: delete a ship after confirmation

use serde_json::json;

use super::{CommandOutput, approve, connect, open_page, report_outcome};
use crate::cli::OutputOptions;
use crate::controller::search::MIN_QUERY_CHARS;
use crate::controller::{DeleteTarget, ListController, SearchSession, ShipForm};
use crate::display::{TableRows, page_footer, render_page};
use crate::error::{DeskError, Result};
use crate::filter::fuzzy_filter;
use crate::types::Ship;

/// List one page of ships
pub async fn cmd_ships_ls(page: u32, filter: Option<&str>, output: OutputOptions) -> Result<()> {
    let client = connect()?;
    let mut ships: ListController<Ship> = ListController::new();
    open_page(&mut ships, &client, page).await?;

    let shown: Vec<Ship> = match filter {
        Some(query) => fuzzy_filter(ships.items(), query)
            .into_iter()
            .map(|scored| scored.item)
            .collect(),
        None => ships.items().to_vec(),
    };

    let store = ships.store();
    let json_output = json!({
        "page": store.current_page(),
        "total_pages": store.total_pages(),
        "total": store.total(),
        "ships": shown,
    });

    let mut text = render_page(&shown, "No ships found");
    text.push('\n');
    text.push_str(&page_footer(store));

    CommandOutput::new(json_output).with_text(text).print(output)
}

/// Look up ships by name or IMO
pub async fn cmd_ships_search(term: &str, output: OutputOptions) -> Result<()> {
    if term.trim().chars().count() < MIN_QUERY_CHARS {
        return Err(DeskError::Validation(format!(
            "search term must be at least {MIN_QUERY_CHARS} characters"
        )));
    }

    let client = connect()?;
    let mut session: SearchSession<Ship> = SearchSession::new();
    session.type_query(&client, term.trim()).await?;

    let found = session.suggestions();
    let text = if found.is_empty() {
        format!("No ships match '{}'", term.trim())
    } else {
        Ship::table(found)
    };

    CommandOutput::new(json!({
        "query": session.query(),
        "ships": found,
    }))
    .with_text(text)
    .print(output)
}

/// Register a new ship
pub async fn cmd_ships_add(form: ShipForm, output: OutputOptions) -> Result<()> {
    let client = connect()?;
    let mut form = form;
    let mut ships: ListController<Ship> = ListController::new();

    let outcome = ships.submit(&client, &mut form).await;
    report_outcome(&ships, outcome, "created", output)
}

/// Delete a ship by uid
pub async fn cmd_ships_rm(uid: &str, yes: bool, output: OutputOptions) -> Result<()> {
    let mut ships: ListController<Ship> = ListController::new();
    ships.request_delete(DeleteTarget::new(uid, format!("ship {uid}")));

    if !approve(&format!("Delete ship {uid}"), yes, output)? {
        ships.cancel_delete();
        println!("Cancelled");
        return Ok(());
    }

    let client = connect()?;
    let outcome = ships.confirm_delete(&client).await;
    report_outcome(&ships, outcome, "deleted", output)
}
