use std::collections::HashMap;

/// Pick the address to probe for a container.
///
/// Returns `None` when the container is not attached to `designated` at all
/// (it has not been reconciled yet). Otherwise returns the designated
/// network's address, falling back to the first non-empty address of any
/// other attached network (ordered by network name). The returned address
/// may still be empty.
pub fn resolve_address(attachments: &HashMap<String, String>, designated: &str) -> Option<String> {
    let primary = attachments.get(designated)?;
    if !primary.is_empty() {
        return Some(primary.clone());
    }

    let mut others: Vec<(&String, &String)> = attachments
        .iter()
        .filter(|(name, ip)| name.as_str() != designated && !ip.is_empty())
        .collect();
    others.sort_by(|a, b| a.0.cmp(b.0));

    Some(others.first().map(|(_, ip)| (*ip).clone()).unwrap_or_default())
}
