//! Load desired principal definitions from YAML or JSON files.
use std::fs::File;

use anyhow::Context;
use anyhow::Result;
use serde::de::DeserializeOwned;

use crate::errors::DesiredStateError;

/// Decode a desired definition from the file at `path`.
pub fn load<T>(path: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let file = File::open(path).with_context(|| DesiredStateError::Open(path.into()))?;
    let desired =
        serde_yaml::from_reader(file).with_context(|| DesiredStateError::Decode(path.into()))?;
    Ok(desired)
}

/// Print an entity to standard output as JSON.
pub fn print<T>(entity: &T) -> Result<()>
where
    T: serde::Serialize,
{
    let entity = serde_json::to_string_pretty(entity)?;
    println!("{}", entity);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use principals_models::Role;
    use principals_models::User;

    use super::load;
    use crate::errors::DesiredStateError;

    #[test]
    fn load_yaml_user() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let yaml = "auth_database: admin\nname: alice\npassword: pw\nroles:\n  - role: readWrite\n    db: app\n";
        file.write_all(yaml.as_bytes()).unwrap();
        let user: User = load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(user.name, "alice");
        assert_eq!(user.roles[0].db, "app");
    }

    #[test]
    fn load_json_role() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let json = r#"{"name": "reporter", "privileges": [{"db": "app", "actions": ["find"]}]}"#;
        file.write_all(json.as_bytes()).unwrap();
        let role: Role = load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(role.database, "admin");
        assert_eq!(role.privileges[0].collection, "");
    }

    #[test]
    fn load_missing_file() {
        let error = load::<User>("/path/to/nowhere/user.yaml").unwrap_err();
        assert!(matches!(
            error.downcast_ref::<DesiredStateError>(),
            Some(DesiredStateError::Open(_))
        ));
    }

    #[test]
    fn load_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"name: [alice\n").unwrap();
        let error = load::<User>(file.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<DesiredStateError>(),
            Some(DesiredStateError::Decode(_))
        ));
    }
}
