// Probing sequence against the built-in backend table, driven by the
// scripted runner (no real processes).

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use glaunch_core::application::{Prober, ReapPolicy};
use glaunch_core::domain::{builtin_backends, LaunchPlan, LaunchVerdict};
use glaunch_core::port::clock::mocks::ManualClock;
use glaunch_core::port::process_runner::mocks::{ScriptedRunner, ScriptedSpawn};
use glaunch_core::port::reporter::mocks::{RecordingReporter, ReportedEvent};

fn prober(runner: Arc<ScriptedRunner>, reporter: Arc<RecordingReporter>) -> Prober {
    Prober::new(
        runner,
        Arc::new(ManualClock::new()),
        reporter,
        ReapPolicy::Reap,
    )
}

fn builtin_plan() -> LaunchPlan {
    LaunchPlan::new(
        "/opt/ivsg/bin/ivsg",
        builtin_backends(Some(Path::new("/usr/share/vulkan/icd.d/lvp_icd.x86_64.json"))),
        Duration::from_secs(2),
    )
    .unwrap()
}

#[tokio::test]
async fn test_software_gl_is_probed_before_vulkan() {
    let runner = Arc::new(ScriptedRunner::new(vec![
        ScriptedSpawn::DiesWithin { exit_code: 1 },
        ScriptedSpawn::Survives { exit_code: 0 },
    ]));
    let reporter = Arc::new(RecordingReporter::new());

    let report = prober(runner.clone(), reporter.clone())
        .launch(&builtin_plan())
        .await
        .unwrap();

    assert_eq!(
        report.verdict,
        LaunchVerdict::Adopted {
            label: "Vulkan (lavapipe)".to_string(),
            exit_code: 0,
        }
    );

    let specs = runner.spawned_specs();
    assert_eq!(specs.len(), 2);
    assert_eq!(
        specs[0].env,
        vec![("LIBGL_ALWAYS_SOFTWARE".to_string(), "1".to_string())]
    );
    assert_eq!(
        specs[1].env,
        vec![
            ("WGPU_BACKEND".to_string(), "vulkan".to_string()),
            (
                "VK_ICD_FILENAMES".to_string(),
                "/usr/share/vulkan/icd.d/lvp_icd.x86_64.json".to_string()
            ),
        ]
    );
}

#[tokio::test]
async fn test_adopting_software_gl_skips_vulkan_entirely() {
    let runner = Arc::new(ScriptedRunner::new(vec![ScriptedSpawn::Survives {
        exit_code: 0,
    }]));
    let reporter = Arc::new(RecordingReporter::new());

    let report = prober(runner.clone(), reporter.clone())
        .launch(&builtin_plan())
        .await
        .unwrap();

    assert_eq!(
        report.verdict,
        LaunchVerdict::Adopted {
            label: "Software OpenGL".to_string(),
            exit_code: 0,
        }
    );
    assert_eq!(runner.spawned_specs().len(), 1);
    assert_eq!(
        reporter.events(),
        vec![
            ReportedEvent::Started("Software OpenGL".to_string()),
            ReportedEvent::Adopted("Software OpenGL".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_exhausted_table_falls_back_with_bare_environment() {
    let runner = Arc::new(ScriptedRunner::new(vec![
        ScriptedSpawn::DiesWithin { exit_code: 1 },
        ScriptedSpawn::DiesWithin { exit_code: 1 },
        ScriptedSpawn::Survives { exit_code: 3 },
    ]));
    let reporter = Arc::new(RecordingReporter::new());

    let report = prober(runner.clone(), reporter.clone())
        .launch(&builtin_plan())
        .await
        .unwrap();

    assert_eq!(report.verdict, LaunchVerdict::FallbackExited { exit_code: 3 });
    assert_eq!(report.verdict.exit_code(), 3);

    let specs = runner.spawned_specs();
    assert_eq!(specs.len(), 3);
    assert!(specs[2].env.is_empty());

    assert_eq!(
        reporter.events(),
        vec![
            ReportedEvent::Started("Software OpenGL".to_string()),
            ReportedEvent::Failed("Software OpenGL".to_string()),
            ReportedEvent::Started("Vulkan (lavapipe)".to_string()),
            ReportedEvent::Failed("Vulkan (lavapipe)".to_string()),
            ReportedEvent::Fallback,
        ]
    );
}
