//! RBAC v1 operations with no backing algorithm. Each one answers a
//! structured `501 Not Implemented`.

crate::placeholder_handlers! {
    list_cross_account_requests,
    create_cross_account_request,
    get_cross_account_request,
    patch_cross_account_request,
    update_cross_account_request,

    list_groups,
    create_group,
    get_group,
    update_group,
    delete_group,
    get_principals_from_group,
    /// Revoking a binding needs the binding ids, which are not tracked per group
    delete_role_from_group,
    list_roles_for_group,

    list_permissions,
    list_permission_options,

    list_policies,
    create_policy,
    get_policy,
    update_policy,
    delete_policy,

    list_principals,

    list_roles,
    get_role,
    /// Would revoke dropped permissions and copy binding subjects onto new
    /// bindings
    update_role,
    patch_role,
    delete_role,

    get_status,
}
