//! Sorted, filtered view over the tracked accounts.
//!
//! The presenter is a pure function of the records and a `ViewState`. The sort
//! direction is passed in on every call; flipping it between calls is up to the
//! caller (see [`ViewState::toggle_sort`]).

use crate::chain::DISPLAY_PLACES;
use crate::tracker::{AccountRecord, AccountStatus};
use crate::utils::shorten_address;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
	Asc,
	#[default]
	Desc,
}

impl SortDirection {
	pub fn toggled(self) -> Self {
		match self {
			SortDirection::Asc => SortDirection::Desc,
			SortDirection::Desc => SortDirection::Asc,
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
	pub direction: SortDirection,
	pub search_term: String,
}

impl ViewState {
	pub fn new(direction: SortDirection, search_term: impl Into<String>) -> Self {
		Self {
			direction,
			search_term: search_term.into(),
		}
	}

	/// Flip the direction and return the one that was in effect before.
	pub fn toggle_sort(&mut self) -> SortDirection {
		let previous = self.direction;
		self.direction = previous.toggled();
		previous
	}
}

/// Order `records` by balance in `state.direction`, then keep those whose
/// address contains the lower-cased search term.
///
/// Records without a settled balance rank as zero. The sort is stable, so equal
/// balances keep insertion order in both directions.
pub fn view<'a>(records: &'a [AccountRecord], state: &ViewState) -> Vec<&'a AccountRecord> {
	let mut sorted: Vec<&AccountRecord> = records.iter().collect();
	sorted.sort_by(|a, b| {
		let (a, b) = (a.sort_balance(), b.sort_balance());
		match state.direction {
			SortDirection::Asc => a.cmp(&b),
			SortDirection::Desc => b.cmp(&a),
		}
	});

	if state.search_term.is_empty() {
		return sorted;
	}

	let needle = state.search_term.to_lowercase();
	sorted
		.into_iter()
		.filter(|record| record.address.as_str().contains(&needle))
		.collect()
}

/// Display-ready row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRow {
	pub address: String,
	pub short_address: String,
	pub balance: String,
}

impl From<&AccountRecord> for AccountRow {
	fn from(record: &AccountRecord) -> Self {
		let balance = match (record.status, record.balance) {
			(AccountStatus::Ready, Some(balance)) => balance.display(DISPLAY_PLACES),
			(AccountStatus::Error, _) => "Error".to_string(),
			_ => "Loading...".to_string(),
		};
		Self {
			address: record.address.to_string(),
			short_address: shorten_address(record.address.as_str()),
			balance,
		}
	}
}

pub fn rows(records: &[AccountRecord], state: &ViewState) -> Vec<AccountRow> {
	view(records, state).into_iter().map(AccountRow::from).collect()
}
