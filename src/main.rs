//! Command-line front end for the explorer core.
//!
//! Drives the same update loop a graphical shell would: each input line
//! becomes one or more messages, worker completions are drained between
//! commands, and notifications are printed as they accumulate.

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use zoomage::config::AppConfig;
use zoomage::message::{
    GalleryMessage, InsightMessage, LabelMessage, Message, PlacementMessage, ViewerMessage,
};
use zoomage::placement::DraftField;
use zoomage::remote::{
    AnalysisType, HttpCollaborator, MemoryCollaborator, RemoteCollaborator,
};
use zoomage::viewer::SoftwareViewerFactory;
use zoomage::viewport::PixelPoint;
use zoomage::App;

fn main() {
    let config = AppConfig::load();
    env_logger::Builder::from_default_env()
        .filter_level(config.log_level.to_level_filter())
        .init();

    let api: Arc<dyn RemoteCollaborator> = match &config.backend_url {
        Some(url) => {
            log::info!("using backend at {url}");
            Arc::new(HttpCollaborator::new(url))
        }
        None => {
            log::info!("no backend configured, using built-in demo collection");
            Arc::new(MemoryCollaborator::with_demo_gallery())
        }
    };

    let mut app = App::new(api, Box::new(SoftwareViewerFactory), config.viewer.clone());
    app.poll_blocking(Duration::from_secs(2));

    println!("zoomage, type 'help' for commands");
    let stdin = io::stdin();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                eprintln!("input error: {e}");
                break;
            }
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" || line == "exit" {
            break;
        }
        dispatch(&mut app, line);

        // Let in-flight work land before prompting again.
        while app.poll_blocking(Duration::from_millis(200)) > 0 {}
        for note in app.take_notifications() {
            println!("! {note}");
        }
    }
}

fn dispatch(app: &mut App, line: &str) {
    let (command, rest) = match line.split_once(' ') {
        Some((c, r)) => (c, r.trim()),
        None => (line, ""),
    };

    match command {
        "help" => print_help(),
        "search" => {
            app.update(Message::Gallery(GalleryMessage::QueryChanged(
                rest.to_string(),
            )));
            app.update(Message::Gallery(GalleryMessage::SearchSubmitted));
        }
        "gallery" => {
            for (i, img) in app.gallery.images.iter().enumerate() {
                println!("{:2}. [{}] {}", i + 1, img.id, img.title);
            }
        }
        "open" => match resolve_image_id(app, rest) {
            Some(id) => app.update(Message::Gallery(GalleryMessage::ImageSelected(id))),
            None => println!("no such image: {rest}"),
        },
        "close" => app.update(Message::Gallery(GalleryMessage::ImageDeselected)),
        "place" => app.update(Message::Placement(PlacementMessage::Toggled)),
        "click" => match parse_two_floats(rest) {
            Some((x, y)) => app.update(Message::Viewer(ViewerMessage::CanvasClicked(
                PixelPoint::new(x, y),
            ))),
            None => println!("usage: click <px> <py>"),
        },
        "set" => match rest.split_once(' ') {
            Some((field, value)) => match parse_field(field) {
                Some(f) => app.update(Message::Placement(PlacementMessage::FieldChanged(
                    f,
                    value.trim().to_string(),
                ))),
                None => println!("unknown field: {field} (name/description/category/width/height)"),
            },
            None => println!("usage: set <field> <value>"),
        },
        "submit" => app.update(Message::Placement(PlacementMessage::Submitted)),
        "cancel" => app.update(Message::Placement(PlacementMessage::Cancelled)),
        "labels" => {
            for label in app.store.labels() {
                println!(
                    "[{}] {} @ ({:.3}, {:.3})",
                    label.id, label.label, label.x, label.y
                );
            }
        }
        "delete" => {
            if rest.is_empty() {
                println!("usage: delete <label-id>");
            } else {
                app.update(Message::Labels(LabelMessage::DeleteRequested(
                    rest.to_string(),
                )));
            }
        }
        "analyze" => {
            let analysis_type = AnalysisType::parse(rest);
            app.update(Message::Insight(InsightMessage::AnalysisRequested(
                analysis_type,
            )));
        }
        "discover" => app.update(Message::Insight(InsightMessage::DiscoveryRequested)),
        "zoom" => match rest {
            "in" => app.update(Message::Viewer(ViewerMessage::ZoomIn)),
            "out" => app.update(Message::Viewer(ViewerMessage::ZoomOut)),
            _ => println!("usage: zoom in|out"),
        },
        "pan" => match parse_two_floats(rest) {
            Some((dx, dy)) => app.update(Message::Viewer(ViewerMessage::Pan(dx, dy))),
            None => println!("usage: pan <dx> <dy>"),
        },
        "rotate" => match rest {
            "left" => app.update(Message::Viewer(ViewerMessage::RotateLeft)),
            "right" => app.update(Message::Viewer(ViewerMessage::RotateRight)),
            _ => println!("usage: rotate left|right"),
        },
        "reset" => app.update(Message::Viewer(ViewerMessage::ResetView)),
        "view" => {
            match app.session.viewport_state() {
                Some(state) => println!(
                    "zoom {:.3}, pan ({:.1}, {:.1}), rotation {:.0}°",
                    state.zoom, state.pan_x, state.pan_y, state.rotation_deg
                ),
                None => println!("no image open"),
            }
            if app.analysis.visible {
                println!("--- analysis ---\n{}", app.analysis.text);
            }
            if app.patterns.visible {
                println!("--- patterns ---\n{}", app.patterns.text);
            }
        }
        _ => println!("unknown command '{command}', try 'help'"),
    }
}

/// Accept either a gallery index (1-based) or a full image id.
fn resolve_image_id(app: &App, arg: &str) -> Option<String> {
    if let Ok(index) = arg.parse::<usize>() {
        if index >= 1 {
            return app
                .gallery
                .images
                .get(index - 1)
                .map(|img| img.id.clone());
        }
    }
    app.gallery.find(arg).map(|img| img.id.clone())
}

fn parse_field(name: &str) -> Option<DraftField> {
    match name {
        "name" => Some(DraftField::Name),
        "description" => Some(DraftField::Description),
        "category" => Some(DraftField::Category),
        "width" => Some(DraftField::Width),
        "height" => Some(DraftField::Height),
        _ => None,
    }
}

fn parse_two_floats(rest: &str) -> Option<(f64, f64)> {
    let mut parts = rest.split_whitespace();
    let a = parts.next()?.parse().ok()?;
    let b = parts.next()?.parse().ok()?;
    Some((a, b))
}

fn print_help() {
    println!(
        "\
commands:
  search <query>        search the image archive
  gallery               list loaded images
  open <n|id>           open an image (gallery index or id)
  close                 close the current image
  zoom in|out           zoom the viewer
  pan <dx> <dy>         pan by a pixel delta
  rotate left|right     rotate the view by 90 degrees
  reset                 reset the view
  view                  show viewport state and open panels
  place                 toggle label placement mode
  click <px> <py>       click the canvas at pixel coordinates
  set <field> <value>   edit the draft (name/description/category/width/height)
  submit                submit the draft label
  cancel                discard the draft
  labels                list labels on the open image
  delete <label-id>     delete a label
  analyze [type]        run AI analysis (general/features/patterns/anomalies)
  discover              discover patterns across saved images
  quit                  exit"
    );
}
