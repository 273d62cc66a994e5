//! Topological driver over the stage DAG (spec.md §9 "Pipeline
//! orchestration" redesign note): stages declare `depends_on`, the driver
//! orders them and supports `--from`/`--to` cuts. Retry/backoff for
//! transient store errors (spec.md §4 "Failure semantics") lives here too,
//! since it's the same policy for every stage.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use pipeline_config::PolicyConfig;
use pipeline_domain::EngineError;
use sqlx::PgPool;
use tracing::{error, warn};

use crate::report::BatchReport;
use crate::stage::Stage;

/// Topologically sort `stages` by `depends_on`, then keep only the slice
/// from `from` to `to` inclusive (both default to the first/last stage).
/// Errors if a dependency name is unknown or a cycle is present.
pub fn topological_order<'a>(
    stages: &[&'a dyn Stage],
    from: Option<&str>,
    to: Option<&str>,
) -> Result<Vec<&'a dyn Stage>, EngineError> {
    let by_name: HashMap<&str, &dyn Stage> = stages.iter().map(|s| (s.name(), *s)).collect();

    let mut resolved: Vec<&dyn Stage> = Vec::with_capacity(stages.len());
    let mut done: HashSet<&str> = HashSet::new();
    let mut visiting: HashSet<&str> = HashSet::new();

    fn visit<'a>(
        name: &str,
        by_name: &HashMap<&str, &'a dyn Stage>,
        done: &mut HashSet<&'a str>,
        visiting: &mut HashSet<&'a str>,
        resolved: &mut Vec<&'a dyn Stage>,
    ) -> Result<(), EngineError> {
        if done.contains(name) {
            return Ok(());
        }
        let stage = *by_name.get(name).ok_or_else(|| {
            EngineError::Configuration(format!("unknown stage dependency: {name}"))
        })?;
        if !visiting.insert(stage.name()) {
            return Err(EngineError::Configuration(format!(
                "dependency cycle detected at stage {name}"
            )));
        }
        for dep in stage.depends_on() {
            visit(dep, by_name, done, visiting, resolved)?;
        }
        visiting.remove(stage.name());
        done.insert(stage.name());
        resolved.push(stage);
        Ok(())
    }

    for stage in stages {
        visit(stage.name(), &by_name, &mut done, &mut visiting, &mut resolved)?;
    }

    let from_idx = match from {
        Some(name) => resolved
            .iter()
            .position(|s| s.name() == name)
            .ok_or_else(|| EngineError::Configuration(format!("unknown --from stage: {name}")))?,
        None => 0,
    };
    let to_idx = match to {
        Some(name) => resolved
            .iter()
            .position(|s| s.name() == name)
            .ok_or_else(|| EngineError::Configuration(format!("unknown --to stage: {name}")))?,
        None => resolved.len().saturating_sub(1),
    };

    if from_idx > to_idx {
        return Err(EngineError::Configuration(
            "--from stage runs after --to stage in dependency order".to_string(),
        ));
    }

    Ok(resolved[from_idx..=to_idx].to_vec())
}

/// Run one stage for one year with up to `max_retries` retries on
/// transient store errors, exponential backoff starting at 200ms.
pub async fn run_with_retry(
    stage: &dyn Stage,
    pool: &PgPool,
    year: &str,
    policy: &PolicyConfig,
    max_retries: u32,
) -> Result<BatchReport, EngineError> {
    let mut attempt = 0u32;
    loop {
        let started = Instant::now();
        match stage.apply(pool, year, policy).await {
            Ok(mut report) => {
                report.elapsed = started.elapsed();
                return Ok(report);
            }
            Err(err) if err.is_transient() && attempt < max_retries => {
                attempt += 1;
                let backoff = Duration::from_millis(200 * 2u64.pow(attempt - 1));
                warn!(
                    stage = stage.name(),
                    academic_year = year,
                    attempt,
                    backoff_ms = backoff.as_millis() as u64,
                    "retrying stage batch after transient error"
                );
                tokio::time::sleep(backoff).await;
            }
            Err(err) => {
                error!(
                    stage = stage.name(),
                    academic_year = year,
                    error = %err,
                    "stage batch failed"
                );
                return Err(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::BatchReport;
    use async_trait::async_trait;

    struct Dummy(&'static str, &'static [&'static str]);

    #[async_trait]
    impl Stage for Dummy {
        fn name(&self) -> &'static str {
            self.0
        }

        fn depends_on(&self) -> &'static [&'static str] {
            self.1
        }

        async fn apply(
            &self,
            _pool: &PgPool,
            _year: &str,
            _policy: &PolicyConfig,
        ) -> Result<BatchReport, EngineError> {
            unreachable!("not exercised in ordering tests")
        }
    }

    #[test]
    fn orders_stages_by_dependency() {
        let a = Dummy("a", &[]);
        let b = Dummy("b", &["a"]);
        let c = Dummy("c", &["b"]);
        let stages: Vec<&dyn Stage> = vec![&c, &a, &b];

        let ordered = topological_order(&stages, None, None).unwrap();
        let names: Vec<_> = ordered.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn from_to_cuts_the_ordered_slice() {
        let a = Dummy("a", &[]);
        let b = Dummy("b", &["a"]);
        let c = Dummy("c", &["b"]);
        let stages: Vec<&dyn Stage> = vec![&a, &b, &c];

        let ordered = topological_order(&stages, Some("b"), Some("b")).unwrap();
        let names: Vec<_> = ordered.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["b"]);
    }

    #[test]
    fn rejects_unknown_dependency() {
        let a = Dummy("a", &["ghost"]);
        let stages: Vec<&dyn Stage> = vec![&a];
        assert!(topological_order(&stages, None, None).is_err());
    }
}
