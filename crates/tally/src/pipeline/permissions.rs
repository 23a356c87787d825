use std::collections::HashSet;
use tally_protocol::PlayerId;

/// Decides who may verify or reject a reading.
pub trait PermissionCheck: Send + Sync {
    fn has_elevated_permission(&self, actor: &PlayerId) -> bool;
}

/// Fixed allow-list, usually from `[review] adjudicators`.
#[derive(Debug, Clone, Default)]
pub struct StaticPermissions {
    adjudicators: HashSet<PlayerId>,
}

impl StaticPermissions {
    pub fn new(adjudicators: impl IntoIterator<Item = PlayerId>) -> Self {
        Self {
            adjudicators: adjudicators.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.adjudicators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjudicators.is_empty()
    }
}

impl PermissionCheck for StaticPermissions {
    fn has_elevated_permission(&self, actor: &PlayerId) -> bool {
        self.adjudicators.contains(actor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_list() {
        let admin = PlayerId::parse("900").unwrap();
        let member = PlayerId::parse("111").unwrap();
        let perms = StaticPermissions::new([admin.clone()]);
        assert!(perms.has_elevated_permission(&admin));
        assert!(!perms.has_elevated_permission(&member));
        assert!(!StaticPermissions::default().has_elevated_permission(&admin));
    }
}
