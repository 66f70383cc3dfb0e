mod common;
mod ledger;
mod roster;
