//! IPv6 address normalization

/// Expand an IPv6 address to eight zero-padded, lowercase hextets
/// (`2001:db8::1` → `2001:0db8:0000:0000:0000:0000:0000:0001`).
///
/// Returns `None` for anything that is not a plain IPv6 address.
pub fn expand_ipv6(input: &str) -> Option<String> {
    let input = input.trim();

    let groups = match input.split_once("::") {
        Some((head, tail)) => {
            if tail.contains("::") {
                return None;
            }
            let head = parse_groups(head)?;
            let tail = parse_groups(tail)?;
            if head.len() + tail.len() > 7 {
                return None;
            }
            let mut groups = head;
            groups.resize(8 - tail.len(), 0);
            groups.extend(tail);
            groups
        }
        None => {
            let groups = parse_groups(input)?;
            if groups.len() != 8 {
                return None;
            }
            groups
        }
    };

    Some(
        groups
            .iter()
            .map(|group| format!("{:04x}", group))
            .collect::<Vec<_>>()
            .join(":"),
    )
}

fn parse_groups(part: &str) -> Option<Vec<u16>> {
    if part.is_empty() {
        return Some(Vec::new());
    }
    part.split(':')
        .map(|group| {
            if group.is_empty() || group.len() > 4 {
                return None;
            }
            u16::from_str_radix(group, 16).ok()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expands_compressed_forms() {
        assert_eq!(
            expand_ipv6("2001:db8::1").as_deref(),
            Some("2001:0db8:0000:0000:0000:0000:0000:0001")
        );
        assert_eq!(
            expand_ipv6("::1").as_deref(),
            Some("0000:0000:0000:0000:0000:0000:0000:0001")
        );
        assert_eq!(
            expand_ipv6("fe80::").as_deref(),
            Some("fe80:0000:0000:0000:0000:0000:0000:0000")
        );
        assert_eq!(
            expand_ipv6("::").as_deref(),
            Some("0000:0000:0000:0000:0000:0000:0000:0000")
        );
    }

    #[test]
    fn test_lowercases_full_form() {
        assert_eq!(
            expand_ipv6("FE80:0:0:0:202:B3FF:FE1E:8329").as_deref(),
            Some("fe80:0000:0000:0000:0202:b3ff:fe1e:8329")
        );
    }

    #[test]
    fn test_rejects_malformed() {
        assert_eq!(expand_ipv6("1::2::3"), None);
        assert_eq!(expand_ipv6("12345::1"), None);
        assert_eq!(expand_ipv6("g::1"), None);
        assert_eq!(expand_ipv6("1:2:3"), None);
        assert_eq!(expand_ipv6("1:2:3:4:5:6:7:8::"), None);
        assert_eq!(expand_ipv6("localhost"), None);
    }
}
