//! Renders Excalidraw drawing notes as a read-only scene the site can mount.

use serde_json::Value as JsonValue;
use thiserror::Error;

/// Script tags loading React, ReactDOM and the Excalidraw bundle. Emitted once
/// per published document, before the first drawing.
pub const BOOTSTRAP: &str = r#"<script src="https://unpkg.com/react@17/umd/react.production.min.js"></script>
<script src="https://unpkg.com/react-dom@17/umd/react-dom.production.min.js"></script>
<script src="https://unpkg.com/@excalidraw/excalidraw@0.10.0/dist/excalidraw.production.min.js"></script>
"#;

const MOUNT_TEMPLATE: &str = r#"<div id="__DRAWING_ID__"></div>
<script>
(function () {
  const scene = __SCENE_JSON__;
  scene.scrollToContent = true;
  const e = React.createElement;
  const App = () =>
    e("div", { style: { height: "500px" } },
      e(ExcalidrawLib.Excalidraw, {
        initialData: scene,
        viewModeEnabled: true,
        zenModeEnabled: true,
        gridModeEnabled: false,
      }));
  ReactDOM.render(e(App), document.getElementById("__DRAWING_ID__"));
})();
</script>
"#;

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

#[derive(Debug, Error)]
pub enum DrawingError {
    #[error("Drawing {0} has no ```json scene block")]
    MissingScene(String),

    #[error("Drawing {file} has invalid scene JSON: {source}")]
    InvalidJson {
        file: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Element id for a drawing: spaces become `_`, the first `.` is dropped and
/// `id_appendage` is added.
pub fn drawing_id(file_name: &str, id_appendage: &str) -> String {
    let underscored = file_name.replace(' ', "_");
    let id = underscored.replacen('.', "", 1);
    format!("{}{}", id, id_appendage)
}

/// Extract the scene JSON of a drawing note: the text between the first
/// ```` ```json ```` and the last ```` ``` ````.
fn scene_json<'a>(raw: &'a str, file_name: &str) -> Result<&'a str, DrawingError> {
    let missing = || DrawingError::MissingScene(file_name.to_string());
    let start = raw.find(JSON_FENCE).ok_or_else(missing)? + JSON_FENCE.len();
    let end = raw.rfind(FENCE).filter(|end| *end >= start).ok_or_else(missing)?;
    Ok(&raw[start..end])
}

/// Render the drawing note `raw` (named `file_name`) as HTML.
pub fn render_drawing(
    raw: &str,
    file_name: &str,
    include_bootstrap: bool,
    id_appendage: &str,
) -> Result<String, DrawingError> {
    let scene: JsonValue =
        serde_json::from_str(scene_json(raw, file_name)?).map_err(|source| DrawingError::InvalidJson {
            file: file_name.to_string(),
            source,
        })?;

    // `</` would close the surrounding script tag
    let compact = scene.to_string().replace("</", "<\\/");

    let mut out = String::new();
    if include_bootstrap {
        out.push_str(BOOTSTRAP);
    }
    out.push_str(
        &MOUNT_TEMPLATE
            .replace("__DRAWING_ID__", &drawing_id(file_name, id_appendage))
            .replace("__SCENE_JSON__", &compact),
    );
    Ok(out)
}
