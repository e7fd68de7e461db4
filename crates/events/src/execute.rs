use hotel_core::Aggregate;

/// Decide, then apply every decided event to the aggregate in place.
///
/// On `Err` nothing was applied: `handle` does all the checking and `apply`
/// cannot fail, so the aggregate is either fully advanced or untouched.
/// Returns the applied events in order, ready to be published.
pub fn execute<A>(aggregate: &mut A, command: &A::Command) -> Result<Vec<A::Event>, A::Error>
where
    A: Aggregate,
{
    let events = aggregate.handle(command)?;
    for event in &events {
        aggregate.apply(event);
    }
    Ok(events)
}
