use serde::{Deserialize, Serialize};

/// Actions a member may perform inside an organization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Read clients, suppliers, products, fiscal years and members
    ReadData,
    /// Create, edit and delete clients, suppliers, products and their children
    WriteData,
    ManageFiscalYears,
    ManageMembers,
    ManageOrganization,
    DeleteOrganization,
}

/// Role held by a member
///
/// Each role grants everything the role below it grants:
/// `Viewer < Editor < Admin < Owner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "member_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Admin,
    Editor,
    Viewer,
}

impl Role {
    /// Returns the permissions granted by this role
    pub fn permissions(&self) -> &'static [Permission] {
        use Permission::*;
        match self {
            Role::Viewer => &[ReadData],
            Role::Editor => &[ReadData, WriteData],
            Role::Admin => &[
                ReadData,
                WriteData,
                ManageFiscalYears,
                ManageMembers,
                ManageOrganization,
            ],
            Role::Owner => &[
                ReadData,
                WriteData,
                ManageFiscalYears,
                ManageMembers,
                ManageOrganization,
                DeleteOrganization,
            ],
        }
    }

    /// Checks whether the role grants a permission
    ///
    /// # Example
    /// ```
    /// use comptoir_api::domain::member::{Permission, Role};
    ///
    /// assert!(Role::Editor.grants(Permission::WriteData));
    /// assert!(!Role::Editor.grants(Permission::ManageMembers));
    /// ```
    pub fn grants(&self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Owner => write!(f, "owner"),
            Role::Admin => write!(f, "admin"),
            Role::Editor => write!(f, "editor"),
            Role::Viewer => write!(f, "viewer"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewer_only_reads() {
        assert!(Role::Viewer.grants(Permission::ReadData));
        assert!(!Role::Viewer.grants(Permission::WriteData));
    }

    #[test]
    fn editor_writes_but_does_not_manage() {
        assert!(Role::Editor.grants(Permission::WriteData));
        assert!(!Role::Editor.grants(Permission::ManageFiscalYears));
        assert!(!Role::Editor.grants(Permission::ManageMembers));
    }

    #[test]
    fn admin_manages_but_cannot_delete_organization() {
        assert!(Role::Admin.grants(Permission::ManageMembers));
        assert!(Role::Admin.grants(Permission::ManageOrganization));
        assert!(Role::Admin.grants(Permission::ManageFiscalYears));
        assert!(!Role::Admin.grants(Permission::DeleteOrganization));
    }

    #[test]
    fn owner_has_everything() {
        for permission in [
            Permission::ReadData,
            Permission::WriteData,
            Permission::ManageFiscalYears,
            Permission::ManageMembers,
            Permission::ManageOrganization,
            Permission::DeleteOrganization,
        ] {
            assert!(Role::Owner.grants(permission));
        }
    }

    #[test]
    fn roles_are_cumulative() {
        let ordered = [Role::Viewer, Role::Editor, Role::Admin, Role::Owner];
        for pair in ordered.windows(2) {
            for permission in pair[0].permissions() {
                assert!(pair[1].grants(*permission), "{} should grant {:?}", pair[1], permission);
            }
        }
    }

    #[test]
    fn role_display() {
        assert_eq!(Role::Owner.to_string(), "owner");
        assert_eq!(Role::Viewer.to_string(), "viewer");
    }
}
