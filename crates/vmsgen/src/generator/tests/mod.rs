mod dedup;
mod parameters;
mod support;
mod visitor;
