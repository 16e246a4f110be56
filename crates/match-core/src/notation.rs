//! Matching free-form chat input against legal move notation.

/// Pick the single legal move `input` refers to.
///
/// Tiers, first one yielding exactly one candidate wins:
/// exact, unique prefix, exact ignoring case, unique prefix ignoring case.
/// Returns the index into `legal`.
pub fn closest_notation<S: AsRef<str>>(legal: &[S], input: &str) -> Option<usize> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    let lower_input = input.to_lowercase();
    let lower: Vec<String> = legal.iter().map(|s| s.as_ref().to_lowercase()).collect();

    let tiers: [Box<dyn Fn(usize) -> bool + '_>; 4] = [
        Box::new(|i| legal[i].as_ref() == input),
        Box::new(|i| legal[i].as_ref().starts_with(input)),
        Box::new(|i| lower[i] == lower_input),
        Box::new(|i| lower[i].starts_with(&lower_input)),
    ];

    tiers.iter().find_map(|matches| unique((0..legal.len()).filter(|&i| matches(i))))
}

fn unique(mut candidates: impl Iterator<Item = usize>) -> Option<usize> {
    let first = candidates.next()?;
    match candidates.next() {
        Some(_) => None,
        None => Some(first),
    }
}
