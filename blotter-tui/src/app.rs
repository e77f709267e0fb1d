//! Application state — single-owner, main-thread only.
//!
//! The desk and combined apps each hold a session on the shared bus; fill
//! driver threads and the bus deliver into those sessions via channels,
//! drained once per event-loop iteration.

use std::collections::HashSet;

use blotter_core::domain::{
    Broker, Instruction, Order, OrderDuration, OrderId, SecurityType, TransactionType,
};
use blotter_core::entry::{DraftError, DraftField, OrderDraft};
use blotter_core::{AppName, Session};
use chrono::NaiveDate;

use crate::theme::Theme;

/// Which panel is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Desk,
    Combined,
    Help,
}

impl Panel {
    pub fn index(self) -> usize {
        match self {
            Panel::Desk => 0,
            Panel::Combined => 1,
            Panel::Help => 2,
        }
    }

    pub fn from_index(i: usize) -> Option<Self> {
        match i {
            0 => Some(Panel::Desk),
            1 => Some(Panel::Combined),
            2 => Some(Panel::Help),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Panel::Desk => "Desk",
            Panel::Combined => "Combined",
            Panel::Help => "Help",
        }
    }

    pub fn next(self) -> Panel {
        Panel::from_index((self.index() + 1) % 3).unwrap()
    }

    pub fn prev(self) -> Panel {
        Panel::from_index((self.index() + 2) % 3).unwrap()
    }
}

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// One blotter app: its session plus cursor and row selection.
pub struct BlotterState {
    pub session: Session,
    pub cursor: usize,
    pub selected: HashSet<OrderId>,
}

impl BlotterState {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            cursor: 0,
            selected: HashSet::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.session.store().len()
    }

    /// The order under the cursor, if any.
    pub fn cursor_order(&self) -> Option<Order> {
        self.session.store().snapshot().get(self.cursor).cloned()
    }

    /// Select/deselect the row under the cursor. Returns the toggled order
    /// when it became selected.
    pub fn toggle_selection(&mut self) -> Option<Order> {
        let order = self.cursor_order()?;
        if self.selected.remove(&order.order_id) {
            None
        } else {
            self.selected.insert(order.order_id);
            Some(order)
        }
    }

    /// Action targets: the selection when present, otherwise the cursor row.
    pub fn target_ids(&self) -> Vec<OrderId> {
        if self.selected.is_empty() {
            self.cursor_order().map(|o| o.order_id).into_iter().collect()
        } else {
            // Blotter order, so actions run top-down.
            self.session
                .store()
                .snapshot()
                .iter()
                .filter(|o| self.selected.contains(&o.order_id))
                .map(|o| o.order_id)
                .collect()
        }
    }

    /// Keep cursor and selection consistent with the store after removals.
    pub fn reconcile(&mut self) {
        let count = self.row_count();
        if self.cursor >= count {
            self.cursor = count.saturating_sub(1);
        }
        let store = self.session.store();
        self.selected.retain(|id| store.contains(*id));
    }
}

/// Order form field, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Ticker,
    TargetPrice,
    TargetQuantity,
    Manager,
    Trader,
    Account,
    TradeDate,
    Broker,
    SecurityType,
    TransactionType,
    Duration,
    Instruction,
}

impl FormField {
    pub const ALL: [FormField; 12] = [
        FormField::Ticker,
        FormField::TargetPrice,
        FormField::TargetQuantity,
        FormField::Manager,
        FormField::Trader,
        FormField::Account,
        FormField::TradeDate,
        FormField::Broker,
        FormField::SecurityType,
        FormField::TransactionType,
        FormField::Duration,
        FormField::Instruction,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::Ticker => "Ticker",
            FormField::TargetPrice => "Target Price",
            FormField::TargetQuantity => "Target Quantity",
            FormField::Manager => "Manager",
            FormField::Trader => "Trader",
            FormField::Account => "Account",
            FormField::TradeDate => "Trade Date",
            FormField::Broker => "Broker",
            FormField::SecurityType => "Security Type",
            FormField::TransactionType => "Transaction Type",
            FormField::Duration => "Duration",
            FormField::Instruction => "Instruction",
        }
    }

    /// Select fields cycle through fixed options; the rest take text.
    pub fn is_select(self) -> bool {
        matches!(
            self,
            FormField::Broker
                | FormField::SecurityType
                | FormField::TransactionType
                | FormField::Duration
                | FormField::Instruction
        )
    }
}

/// A field-level problem shown inline in the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: FormField,
    pub message: String,
}

/// Order entry form state: text buffers for free fields, indices into the
/// option lists for select fields.
pub struct FormState {
    pub ticker: String,
    pub target_price: String,
    pub target_quantity: String,
    pub manager: String,
    pub trader: String,
    pub account: String,
    pub trade_date: String,
    pub broker_idx: usize,
    pub security_type_idx: usize,
    pub transaction_type_idx: usize,
    pub duration_idx: usize,
    pub instruction_idx: usize,
    pub cursor: usize,
    pub errors: Vec<FieldError>,
}

impl FormState {
    pub fn from_draft(draft: &OrderDraft) -> Self {
        Self {
            ticker: draft.ticker.clone(),
            target_price: format_price(draft.target_price),
            target_quantity: draft.target_quantity.to_string(),
            manager: draft.manager.clone(),
            trader: draft.trader.clone(),
            account: draft.account.clone(),
            trade_date: draft.trade_date.format("%Y-%m-%d").to_string(),
            broker_idx: position_of(&Broker::ALL, draft.broker),
            security_type_idx: position_of(&SecurityType::ALL, draft.security_type),
            transaction_type_idx: position_of(&TransactionType::ALL, draft.transaction_type),
            duration_idx: position_of(&OrderDuration::ALL, draft.duration),
            instruction_idx: position_of(&Instruction::ALL, draft.instruction),
            cursor: 0,
            errors: Vec::new(),
        }
    }

    pub fn active_field(&self) -> FormField {
        FormField::ALL[self.cursor]
    }

    pub fn next_field(&mut self) {
        self.cursor = (self.cursor + 1) % FormField::ALL.len();
    }

    pub fn prev_field(&mut self) {
        self.cursor = (self.cursor + FormField::ALL.len() - 1) % FormField::ALL.len();
    }

    /// Type into the active text field. Select fields ignore typed input.
    pub fn insert_char(&mut self, c: char) {
        if let Some(buffer) = self.active_buffer() {
            buffer.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(buffer) = self.active_buffer() {
            buffer.pop();
        }
    }

    fn active_buffer(&mut self) -> Option<&mut String> {
        match self.active_field() {
            FormField::Ticker => Some(&mut self.ticker),
            FormField::TargetPrice => Some(&mut self.target_price),
            FormField::TargetQuantity => Some(&mut self.target_quantity),
            FormField::Manager => Some(&mut self.manager),
            FormField::Trader => Some(&mut self.trader),
            FormField::Account => Some(&mut self.account),
            FormField::TradeDate => Some(&mut self.trade_date),
            _ => None,
        }
    }

    /// Cycle the active select field by `step` (+1 / -1).
    pub fn cycle(&mut self, step: isize) {
        match self.active_field() {
            FormField::Broker => cycle_index(&mut self.broker_idx, Broker::ALL.len(), step),
            FormField::SecurityType => {
                cycle_index(&mut self.security_type_idx, SecurityType::ALL.len(), step);
            }
            FormField::TransactionType => {
                cycle_index(&mut self.transaction_type_idx, TransactionType::ALL.len(), step);
            }
            FormField::Duration => {
                cycle_index(&mut self.duration_idx, OrderDuration::ALL.len(), step);
            }
            FormField::Instruction => {
                cycle_index(&mut self.instruction_idx, Instruction::ALL.len(), step);
            }
            _ => {}
        }
    }

    /// Displayed value for a field.
    pub fn field_value(&self, field: FormField) -> String {
        match field {
            FormField::Ticker => self.ticker.clone(),
            FormField::TargetPrice => self.target_price.clone(),
            FormField::TargetQuantity => self.target_quantity.clone(),
            FormField::Manager => self.manager.clone(),
            FormField::Trader => self.trader.clone(),
            FormField::Account => self.account.clone(),
            FormField::TradeDate => self.trade_date.clone(),
            FormField::Broker => Broker::ALL[self.broker_idx].label().to_string(),
            FormField::SecurityType => SecurityType::ALL[self.security_type_idx].label().to_string(),
            FormField::TransactionType => {
                TransactionType::ALL[self.transaction_type_idx].label().to_string()
            }
            FormField::Duration => OrderDuration::ALL[self.duration_idx].label().to_string(),
            FormField::Instruction => Instruction::ALL[self.instruction_idx].label().to_string(),
        }
    }

    pub fn error_for(&self, field: FormField) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// Parse and validate into a draft. On failure the field errors are
    /// recorded for inline display and `None` is returned.
    pub fn try_into_draft(&mut self) -> Option<OrderDraft> {
        let mut errors = Vec::new();

        let target_price = match self.target_price.trim().parse::<f64>() {
            Ok(price) => price,
            Err(_) => {
                errors.push(FieldError {
                    field: FormField::TargetPrice,
                    message: "not a number".to_string(),
                });
                0.0
            }
        };
        let target_quantity = match self.target_quantity.trim().parse::<u32>() {
            Ok(qty) => qty,
            Err(_) => {
                errors.push(FieldError {
                    field: FormField::TargetQuantity,
                    message: "not a whole number".to_string(),
                });
                0
            }
        };
        let trade_date = match NaiveDate::parse_from_str(self.trade_date.trim(), "%Y-%m-%d") {
            Ok(date) => date,
            Err(_) => {
                errors.push(FieldError {
                    field: FormField::TradeDate,
                    message: "expected YYYY-MM-DD".to_string(),
                });
                NaiveDate::default()
            }
        };

        if !errors.is_empty() {
            self.errors = errors;
            return None;
        }

        let draft = OrderDraft {
            ticker: self.ticker.trim().to_string(),
            manager: self.manager.trim().to_string(),
            trader: self.trader.trim().to_string(),
            account: self.account.trim().to_string(),
            broker: Broker::ALL[self.broker_idx],
            security_type: SecurityType::ALL[self.security_type_idx],
            transaction_type: TransactionType::ALL[self.transaction_type_idx],
            duration: OrderDuration::ALL[self.duration_idx],
            instruction: Instruction::ALL[self.instruction_idx],
            target_price,
            target_quantity,
            trade_date,
        };

        match draft.validate() {
            Ok(()) => {
                self.errors.clear();
                Some(draft)
            }
            Err(draft_errors) => {
                self.errors = draft_errors.iter().map(field_error).collect();
                None
            }
        }
    }
}

fn field_error(err: &DraftError) -> FieldError {
    let field = match err.field() {
        DraftField::Ticker => FormField::Ticker,
        DraftField::Manager => FormField::Manager,
        DraftField::Trader => FormField::Trader,
        DraftField::Account => FormField::Account,
        DraftField::TargetPrice => FormField::TargetPrice,
        DraftField::TargetQuantity => FormField::TargetQuantity,
    };
    let message = match err {
        DraftError::Required(_) => "required".to_string(),
        DraftError::NotPositive(_) => "must be positive".to_string(),
    };
    FieldError { field, message }
}

fn position_of<T: PartialEq + Copy>(options: &[T], value: T) -> usize {
    options.iter().position(|o| *o == value).unwrap_or(0)
}

fn cycle_index(index: &mut usize, len: usize, step: isize) {
    let len = len as isize;
    *index = ((*index as isize + step).rem_euclid(len)) as usize;
}

fn format_price(price: f64) -> String {
    if price.fract() == 0.0 {
        format!("{price:.0}")
    } else {
        format!("{price}")
    }
}

/// Which overlay (if any) is shown on top.
pub enum Overlay {
    None,
    Welcome,
    Form(FormState),
}

/// Top-level application state.
pub struct AppState {
    // Navigation
    pub active_panel: Panel,
    pub running: bool,

    // The two apps sharing the bus
    pub desk: BlotterState,
    pub combined: BlotterState,
    /// Destination identity for "send to combined".
    pub combined_app: AppName,

    // Cross-cutting
    pub overlay: Overlay,
    pub status_message: Option<(String, StatusLevel)>,
    pub draft_defaults: OrderDraft,
    pub theme: Theme,
}

impl AppState {
    pub fn new(
        desk: Session,
        combined: Session,
        combined_app: AppName,
        draft_defaults: OrderDraft,
    ) -> Self {
        Self {
            active_panel: Panel::Desk,
            running: true,
            desk: BlotterState::new(desk),
            combined: BlotterState::new(combined),
            combined_app,
            overlay: Overlay::Welcome,
            status_message: None,
            draft_defaults,
            theme: Theme::default(),
        }
    }

    /// The blotter backing the active panel (Help has none).
    pub fn active_blotter(&mut self) -> Option<&mut BlotterState> {
        match self.active_panel {
            Panel::Desk => Some(&mut self.desk),
            Panel::Combined => Some(&mut self.combined),
            Panel::Help => None,
        }
    }

    /// Drain both sessions' inboxes and surface the results in the status
    /// line. Called once per event-loop iteration.
    pub fn pump_sessions(&mut self) {
        let mut last_status = None;
        for blotter in [&mut self.desk, &mut self.combined] {
            let app = blotter.session.app_name().clone();
            for event in blotter.session.pump() {
                last_status = Some((format!("[{app}] {event}"), StatusLevel::Info));
            }
            blotter.reconcile();
        }
        if let Some(status) = last_status {
            self.status_message = Some(status);
        }
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }

    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Error));
    }
}
