pub mod graph_canvas;
