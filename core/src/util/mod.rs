pub mod line_window;
