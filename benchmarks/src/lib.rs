//! Synthetic project fixtures for benchmarks

use serde_json::{json, Map, Value};

/// Build the JSON form of a project with `targets` native targets.
///
/// Each target gets a configuration list with Debug and Release
/// configurations, three build phases, a product file reference and a
/// dependency on the previous target.
pub fn synthetic_project(targets: usize) -> Value {
    let mut objects = Map::new();
    let mut target_ids = Vec::with_capacity(targets);

    for i in 0..targets {
        let target = format!("T{:023}", i);
        let list = format!("L{:023}", i);
        let debug = format!("C{:023}", i * 2);
        let release = format!("C{:023}", i * 2 + 1);
        let product = format!("F{:023}", i);
        let phases: Vec<String> = (0..3).map(|p| format!("P{:022}{}", i, p)).collect();

        let mut dependencies = Vec::new();
        if i > 0 {
            let dependency = format!("D{:023}", i);
            objects.insert(
                dependency.clone(),
                json!({ "isa": "PBXTargetDependency", "target": target_ids[i - 1] }),
            );
            dependencies.push(dependency);
        }

        objects.insert(
            target.clone(),
            json!({
                "isa": "PBXNativeTarget",
                "name": format!("Module{}", i),
                "buildConfigurationList": list,
                "buildPhases": phases,
                "buildRules": [],
                "dependencies": dependencies,
                "productName": format!("Module{}", i),
                "productReference": product,
                "productType": "com.apple.product-type.framework",
            }),
        );
        objects.insert(
            list,
            json!({
                "isa": "XCConfigurationList",
                "buildConfigurations": [debug, release],
                "defaultConfigurationIsVisible": "0",
                "defaultConfigurationName": "Release",
            }),
        );
        for (id, name, optimization) in [(&debug, "Debug", "-Onone"), (&release, "Release", "-O")] {
            objects.insert(
                id.clone(),
                json!({
                    "isa": "XCBuildConfiguration",
                    "name": name,
                    "buildSettings": {
                        "PRODUCT_NAME": "$(TARGET_NAME)",
                        "SWIFT_OPTIMIZATION_LEVEL": optimization,
                        "SWIFT_VERSION": "5.0",
                        "OTHER_LDFLAGS": ["$(inherited)", "-ObjC"],
                    },
                }),
            );
        }
        for (phase, isa) in phases.iter().zip([
            "PBXSourcesBuildPhase",
            "PBXFrameworksBuildPhase",
            "PBXResourcesBuildPhase",
        ]) {
            objects.insert(phase.clone(), json!({ "isa": isa, "files": [] }));
        }
        objects.insert(
            product,
            json!({
                "isa": "PBXFileReference",
                "explicitFileType": "wrapper.framework",
                "path": format!("Module{}.framework", i),
                "sourceTree": "BUILT_PRODUCTS_DIR",
            }),
        );
        target_ids.push(target);
    }

    let root = "R00000000000000000000000";
    objects.insert(
        root.to_string(),
        json!({ "isa": "PBXProject", "targets": target_ids }),
    );

    json!({
        "archiveVersion": "1",
        "classes": {},
        "objectVersion": "56",
        "objects": objects,
        "rootObject": root,
    })
}
