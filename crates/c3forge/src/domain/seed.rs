//! Starter project loaded at session start.
//!
//! A Construct 3 top-down shooter template: project metadata, scripts, one
//! event sheet, and an image placeholder.

use super::project::{Node, NodeId, ProjectTree, ProjectTreeError};

/// File selected when a session starts.
pub const DEFAULT_SELECTED_ID: &str = "file-main-js";

const PROJECT_FILE: &str = r#"{
  "name": "TopDownShooter",
  "version": "1.0.0.0",
  "author": "C3 Forge User",
  "uniqueId": "12345678-1234-1234-1234-123456789012",
  "next_uid": 100,
  "project_settings": {
    "pixel_rounding": false,
    "use_loader_layout": false
  },
  "objectTypes": [],
  "families": [],
  "layouts": [],
  "eventSheets": []
}"#;

const MAIN_SCRIPT: &str = r#"
// Import any other script files here, e.g.
// import * as myModule from "./myModule.js";

runOnStartup(async runtime => {
	// Code to run on the loading screen.
	// Note layouts, objects etc. are not yet available.
	
	runtime.addEventListener("beforeprojectstart", () => OnBeforeProjectStart(runtime));
});

async function OnBeforeProjectStart(runtime)
{
	// Code to run just before 'On start of layout' on the first layout.
	// Loading has finished and initial instances are created and available.
	
	runtime.addEventListener("tick", () => Tick(runtime));
}

function Tick(runtime)
{
	// Code to run every tick
    const dt = runtime.dt;
    
    // Example: Player Logic
    const player = runtime.objects.Player?.getFirstInstance();
    if (player) {
        // Basic Top-Down Movement
        const speed = 200;
        const keyboard = runtime.keyboard;
        
        if (keyboard) {
            if (keyboard.isKeyDown("ArrowRight")) player.x += speed * dt;
            if (keyboard.isKeyDown("ArrowLeft")) player.x -= speed * dt;
            if (keyboard.isKeyDown("ArrowUp")) player.y -= speed * dt;
            if (keyboard.isKeyDown("ArrowDown")) player.y += speed * dt;
            
            // Mouse Aiming
            const mouse = runtime.mouse;
            if (mouse) {
                const mouseX = mouse.getMouseX();
                const mouseY = mouse.getMouseY();
                const angle = Math.atan2(mouseY - player.y, mouseX - player.x);
                player.angle = angle;
            }
        }
    }
}
"#;

const UTILS_SCRIPT: &str = "// Utility functions for the game\n\nexport function getDistance(x1, y1, x2, y2) {\n\treturn Math.sqrt((x2-x1)**2 + (y2-y1)**2);\n}";

const EVENT_SHEET: &str = r#"{
  "name": "EventSheet1",
  "events": [
    {
      "eventType": "block",
      "conditions": [
        { "id": "system-on-start-of-layout" }
      ],
      "actions": [
        { "id": "system-log", "parameters": ["Game Started"] }
      ]
    }
  ]
}"#;

const IMAGE_PLACEHOLDER: &str = "(Binary content placeholder)";

/// Returns the id of the file selected when a session starts.
pub fn default_selection() -> NodeId {
    NodeId::new(DEFAULT_SELECTED_ID)
}

/// Builds the starter project tree.
///
/// # Errors
/// Returns [`ProjectTreeError`] if the seed nodes violate tree invariants.
pub fn initial_project() -> Result<ProjectTree, ProjectTreeError> {
    ProjectTree::new(vec![
        Node::file("root-project", "project.c3proj", Some(PROJECT_FILE.to_string())),
        Node::folder(
            "folder-scripts",
            "scripts",
            true,
            vec![
                Node::file("file-main-js", "main.js", Some(MAIN_SCRIPT.to_string())),
                Node::file("file-utils-js", "utils.js", Some(UTILS_SCRIPT.to_string())),
            ],
        ),
        Node::folder(
            "folder-events",
            "eventSheets",
            false,
            vec![Node::file(
                "file-es1",
                "EventSheet1.json",
                Some(EVENT_SHEET.to_string()),
            )],
        ),
        Node::folder(
            "folder-images",
            "images",
            false,
            vec![Node::file(
                "file-placeholder-png",
                "shared-0-sheet0.png",
                Some(IMAGE_PLACEHOLDER.to_string()),
            )],
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_project_builds_with_unique_ids() {
        // Arrange & Act
        let tree = initial_project().expect("seed project should build");

        // Assert
        assert_eq!(tree.len(), 8);
        assert_eq!(tree.roots().len(), 4);
    }

    #[test]
    fn test_default_selection_resolves_to_loaded_script() {
        // Arrange
        let tree = initial_project().expect("seed project should build");

        // Act
        let selected = tree.find(&default_selection());

        // Assert
        assert_eq!(selected.map(|node| node.name()), Some("main.js"));
        assert!(
            selected
                .and_then(|node| node.content())
                .is_some_and(|content| content.contains("runOnStartup"))
        );
    }

    #[test]
    fn test_initial_project_expands_only_scripts_folder() {
        // Arrange
        let tree = initial_project().expect("seed project should build");

        // Act
        let rows = tree.visible_rows();

        // Assert
        let visible: Vec<&str> = rows.iter().map(|row| row.node.id().as_str()).collect();
        assert_eq!(
            visible,
            vec![
                "root-project",
                "folder-scripts",
                "file-main-js",
                "file-utils-js",
                "folder-events",
                "folder-images",
            ]
        );
    }
}
