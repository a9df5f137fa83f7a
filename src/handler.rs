use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crate::app::{App, Picker};
use crate::tui::AppEvent;

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key).await,
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
    }

    // Every path that can change the selection passes through here
    app.sync_commentary().await;
    app.poll_commentary().await;
    Ok(())
}

async fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.picker.is_some() {
        handle_picker(app, key).await;
    } else {
        handle_reading(app, key).await;
    }
}

async fn handle_picker(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.picker = None,
        KeyCode::Char('j') | KeyCode::Down => app.picker_down(),
        KeyCode::Char('k') | KeyCode::Up => app.picker_up(),
        KeyCode::Enter => app.confirm_picker().await,
        _ => {}
    }
}

async fn handle_reading(app: &mut App, key: KeyEvent) {
    match key.code {
        // Quit
        KeyCode::Char('q') => app.should_quit = true,

        // Chapters and editions
        KeyCode::Char('n') | KeyCode::PageDown => app.next_chapter().await,
        KeyCode::Char('p') | KeyCode::PageUp => app.previous_chapter().await,
        KeyCode::Char('e') => app.switch_edition().await,
        KeyCode::Char('b') => app.open_picker(Picker::Book),
        KeyCode::Char('c') => app.open_picker(Picker::Chapter),

        // Reading cursor
        KeyCode::Char('j') | KeyCode::Down => app.next_verse(),
        KeyCode::Char('k') | KeyCode::Up => app.prev_verse(),
        KeyCode::Char('l') | KeyCode::Right => app.next_word(),
        KeyCode::Char('h') | KeyCode::Left => app.prev_word(),

        // Selection
        KeyCode::Enter => app.select_focused_word(),
        KeyCode::Char('v') => app.select_focused_verse(),
        KeyCode::Esc => app.clear_selection(),
        KeyCode::Char('s') => app.toggle_continuous(),

        // Commentary tabs
        KeyCode::Tab => app.cycle_tab().await,
        KeyCode::Char(d @ '1'..='9') => {
            let n = d as usize - '1' as usize;
            app.open_tab(n).await;
        }
        KeyCode::Char('J') => app.scroll_info_down(),
        KeyCode::Char('K') => app.scroll_info_up(),

        _ => {}
    }
}
