#![allow(dead_code)]

pub mod fixtures {
    use std::fs;
    use std::path::Path;

    use tempfile::TempDir;
    use walkdir::WalkDir;

    /// Files a previous generation run wrote.
    pub const GENERATED: &[&str] = &[
        "src/core/app.js",
        "src/core/controllers/employee.controller.js",
        "src/core/routes/employee.routes.js",
        "src/core/schemas/employee.schema.js",
        "tests/core/employee.test.js",
        "tests/factories/employee.factory.js",
        "docs/api.md",
        "package.json",
    ];

    /// Files a developer added by hand after that run.
    pub const HAND_WRITTEN: &[&str] = &[
        ".env",
        ".env.local",
        "package-lock.json",
        "src/domain/employee/employee.interceptor.js",
        "src/domain/employee/payroll/rules.js",
        "tests/domain/payroll.test.js",
    ];

    pub fn write_file(root: &Path, rel: &str, body: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, body).unwrap();
    }

    /// A service root holding both generated and hand-written files.
    pub fn service() -> TempDir {
        let dir = TempDir::new().unwrap();
        for rel in GENERATED.iter().chain(HAND_WRITTEN) {
            write_file(dir.path(), rel, &format!("// {rel}\n"));
        }
        dir
    }

    /// Every file under `root`, relative, `/`-separated and sorted.
    pub fn list_files(root: &Path) -> Vec<String> {
        let mut files: Vec<String> = WalkDir::new(root)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                e.path()
                    .strip_prefix(root)
                    .unwrap()
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .collect();
        files.sort();
        files
    }
}

pub mod hooks {
    use msgen::interceptor::{HookResult, InterceptorHooks};
    use serde_json::json;

    /// Hooks that stamp an audit field, refuse deletes of locked rows and
    /// scope every list to the caller's tenant.
    pub fn employee_hooks() -> InterceptorHooks {
        InterceptorHooks::new()
            .before_create(|mut data, ctx| async move {
                let user = ctx.user.as_deref().cloned().unwrap_or(json!(null));
                data["createdBy"] = user["id"].clone();
                Ok(HookResult::pass(data))
            })
            .before_delete(|data, _ctx| async move {
                if data["locked"] == json!(true) {
                    return Ok(HookResult::halt(
                        data,
                        json!({ "status": 423, "message": "record is locked" }),
                    ));
                }
                Ok(HookResult::pass(data))
            })
            .before_list(|_data, ctx| async move {
                let tenant = ctx.request["tenantId"].clone();
                let query = ctx
                    .query_builder()
                    .map(|b| b.where_(json!({ "tenantId": tenant })).build())
                    .unwrap_or_default();
                Ok::<_, anyhow::Error>(HookResult::pass(query.to_value()?))
            })
    }
}
