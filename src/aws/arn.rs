//! ARN and role-session naming helpers.

/// STS limit on `RoleSessionName`.
const MAX_SESSION_NAME_LEN: usize = 64;

const SESSION_NAME_PREFIX: &str = "RatkiezScan-";

/// Partition for a region name (`aws`, `aws-cn` or `aws-us-gov`).
pub fn partition_for_region(region: &str) -> &'static str {
    if region.starts_with("cn-") {
        "aws-cn"
    } else if region.starts_with("us-gov-") {
        "aws-us-gov"
    } else {
        "aws"
    }
}

/// ARN of `role_name` in `account_id`.
///
/// ```
/// use ratkiez::aws::arn::role_arn;
///
/// assert_eq!(
///     role_arn("aws", "123456789012", "OrganizationAccountAccessRole"),
///     "arn:aws:iam::123456789012:role/OrganizationAccountAccessRole"
/// );
/// ```
pub fn role_arn(partition: &str, account_id: &str, role_name: &str) -> String {
    format!("arn:{}:iam::{}:role/{}", partition, account_id, role_name)
}

/// Role session name embedding the originating profile label.
///
/// STS only accepts `[\w+=,.@-]` and at most 64 characters, so anything else
/// in the label is replaced with `-` and the result is truncated.
pub fn role_session_name(profile_label: &str) -> String {
    let mut name = String::with_capacity(MAX_SESSION_NAME_LEN);
    name.push_str(SESSION_NAME_PREFIX);
    for c in profile_label.chars() {
        if name.len() >= MAX_SESSION_NAME_LEN {
            break;
        }
        if c.is_ascii_alphanumeric() || "_+=,.@-".contains(c) {
            name.push(c);
        } else {
            name.push('-');
        }
    }
    name
}
